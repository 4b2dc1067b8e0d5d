//! VW `--readable_model` text format.
//!
//! ```text
//! Version 8.6.1
//! Id
//! Min label:-1
//! Max label:1
//! bits:18
//! lda:0
//! 0 ngram:
//! 0 skip:
//! options: --hash_seed 0 --link identity
//! Checksum: 3984224786
//! :0
//! 116060:0.532933
//! 155256:0.192113
//! ```
//!
//! Header lines are recognized by substring markers; values follow the first
//! `:`. The line `:0` ends the header and every later line is
//! `<bucket>:<weight>`.

use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::model::{check_num_bits, Model, ModelHeader, OptionConfig};

use super::LoadError;

/// Line separating the header from the weights.
const SENTINEL: &str = ":0";

/// Header state accumulated before the sentinel.
struct HeaderState {
    header: ModelHeader,
    weights: Option<Vec<f32>>,
}

impl HeaderState {
    fn new() -> Self {
        Self {
            header: ModelHeader::default(),
            weights: None,
        }
    }

    fn read_line(&mut self, line: &str) -> Result<(), LoadError> {
        if line.contains("options") {
            self.header.options = line
                .split_once(':')
                .map(|(_, rest)| rest.trim().to_string())
                .unwrap_or_default();
            return Ok(());
        }

        if let Some(version) = line.strip_prefix("Version ") {
            self.header.version = version.trim().to_string();
        } else if let Some(id) = line.strip_prefix("Id") {
            self.header.id = id.trim().to_string();
        }

        if line.contains("bits:") {
            let num_bits: u32 = parse_field("bits", value_of(line).unwrap_or_default())?;
            check_num_bits(num_bits)?;
            self.header.num_bits = num_bits;
            self.weights = Some(vec![0.0; self.header.table_size()]);
        }
        if line.contains("Min label") {
            self.header.min_label = parse_field("min_label", value_of(line).unwrap_or_default())?;
        }
        if line.contains("Max label") {
            self.header.max_label = parse_field("max_label", value_of(line).unwrap_or_default())?;
        }
        if line.contains("ngram") {
            let ngram: i64 = parse_field("ngram", value_of(line).unwrap_or("0"))?;
            if ngram != 0 {
                return Err(LoadError::unsupported(format!("ngram ({ngram})")));
            }
        }
        if line.contains("skip") {
            let skip: i64 = parse_field("skip", value_of(line).unwrap_or("0"))?;
            if skip != 0 {
                return Err(LoadError::unsupported(format!("skip ({skip})")));
            }
        }
        Ok(())
    }
}

/// Text after the first `:`, trimmed; `None` when the line has no `:` or
/// nothing follows it.
fn value_of(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once(':')?;
    let rest = rest.split(':').next().unwrap_or_default().trim();
    (!rest.is_empty()).then_some(rest)
}

fn parse_field<T>(field: &'static str, text: &str) -> Result<T, LoadError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    text.parse()
        .map_err(|e: T::Err| LoadError::invalid(field, format!("{text:?}: {e}")))
}

/// Parse one `<bucket>:<weight>` body line into `weights`.
fn read_weight(line: &str, weights: &mut [f32]) -> Result<(), LoadError> {
    let (bucket, value) = line
        .split_once(':')
        .ok_or_else(|| LoadError::invalid("weights", format!("expected bucket:weight, got {line:?}")))?;
    let bucket: u64 = parse_field("bucket", bucket.trim())?;
    let value: f32 = parse_field("weight", value.trim())?;

    let table_size = weights.len();
    let slot = usize::try_from(bucket)
        .ok()
        .and_then(|b| weights.get_mut(b))
        .ok_or(LoadError::BucketOutOfRange { bucket, table_size })?;
    *slot = value;
    Ok(())
}

fn load_lines<I, S>(lines: I) -> Result<Model, LoadError>
where
    I: IntoIterator<Item = Result<S, LoadError>>,
    S: AsRef<str>,
{
    let mut state = HeaderState::new();
    let mut in_header = true;

    for line in lines {
        let line = line?;
        let line = line.as_ref().trim_end();

        if in_header {
            if line == SENTINEL {
                in_header = false;
            } else {
                state.read_line(line)?;
            }
            continue;
        }

        if line.is_empty() {
            continue;
        }
        let weights = state
            .weights
            .as_mut()
            .ok_or_else(|| LoadError::MalformedHeader("weights before any bits line".into()))?;
        read_weight(line, weights)?;
    }

    let weights = state
        .weights
        .ok_or_else(|| LoadError::MalformedHeader("no bits line".into()))?;
    let config = OptionConfig::parse(&state.header.options)?;
    let model = Model::with_config(state.header, config, weights)?;
    super::log_loaded("text", &model);
    Ok(model)
}

/// Load a text model from its lines.
///
/// # Example
///
/// ```
/// use vw_slim::io::load_text;
///
/// let text = "bits:4\nMin label:-1\nMax label:1\noptions: --link identity\n:0\n3:0.5\n";
/// let model = load_text(text.lines()).unwrap();
/// assert_eq!(model.num_bits(), 4);
/// assert_eq!(model.weight(3), 0.5);
/// ```
pub fn load_text<I, S>(lines: I) -> Result<Model, LoadError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    load_lines(lines.into_iter().map(Ok))
}

/// Read a text model from a buffered reader.
pub fn read_text<R: BufRead>(reader: R) -> Result<Model, LoadError> {
    load_lines(reader.lines().map(|line| line.map_err(LoadError::from)))
}

/// Write `model` in `--readable_model` form.
///
/// Only non-zero weights are written, in ascending bucket order.
pub fn write_text<W: Write>(model: &Model, mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "Version {}", model.version())?;
    writeln!(writer, "Id {}", model.id())?;
    writeln!(writer, "Min label:{}", model.min_label())?;
    writeln!(writer, "Max label:{}", model.max_label())?;
    writeln!(writer, "bits:{}", model.num_bits())?;
    writeln!(writer, "lda:0")?;
    writeln!(writer, "0 ngram:")?;
    writeln!(writer, "0 skip:")?;
    writeln!(writer, "options: {}", model.options().trim())?;
    writeln!(writer, "Checksum: {}", super::binary::header_checksum(model))?;
    writeln!(writer, "{SENTINEL}")?;
    for (bucket, weight) in model.non_zero_weights() {
        writeln!(writer, "{bucket}:{weight}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinkKind;

    const SAMPLE: &str = "\
Version 8.6.1
Id
Min label:-2
Max label:2
bits:4
lda:0
0 ngram:
0 skip:
options: --hash_seed 0 --link logistic
Checksum: 3984224786
:0
3:0.532933
15:-0.25
";

    #[test]
    fn parses_header_and_weights() {
        let model = load_text(SAMPLE.lines()).unwrap();
        assert_eq!(model.version(), "8.6.1");
        assert_eq!(model.id(), "");
        assert_eq!(model.min_label(), -2.0);
        assert_eq!(model.max_label(), 2.0);
        assert_eq!(model.num_bits(), 4);
        assert_eq!(model.options(), "--hash_seed 0 --link logistic");
        assert_eq!(model.config().link(), LinkKind::Logistic);
        assert_eq!(model.weight(3), 0.532933);
        assert_eq!(model.weight(15), -0.25);
        assert_eq!(model.non_zero_weights().count(), 2);
    }

    #[test]
    fn missing_labels_mean_no_clipping() {
        let model = load_text(["bits:2", ":0"]).unwrap();
        assert_eq!(model.min_label(), f32::NEG_INFINITY);
        assert_eq!(model.max_label(), f32::INFINITY);
    }

    #[test]
    fn requires_bits_line() {
        let err = load_text(["Min label:0", "options:", ":0"]).unwrap_err();
        assert!(matches!(err, LoadError::MalformedHeader(_)));

        let err = load_text([":0", "1:0.5"]).unwrap_err();
        assert!(matches!(err, LoadError::MalformedHeader(_)));
    }

    #[test]
    fn rejects_ngram_and_skip() {
        let err = load_text(["bits:2", "2 ngram:2", ":0"]).unwrap_err();
        assert!(matches!(err, LoadError::Unsupported(_)));

        let err = load_text(["bits:2", "skip:1", ":0"]).unwrap_err();
        assert!(matches!(err, LoadError::Unsupported(_)));
    }

    #[test]
    fn options_line_is_not_scanned_for_markers() {
        let model = load_text(["bits:2", "options: --ngram 0 --skip 0 --link poisson", ":0"]).unwrap();
        assert_eq!(model.config().link(), LinkKind::Poisson);
    }

    #[test]
    fn options_keep_everything_after_first_colon() {
        let model = load_text(["bits:2", "options: -q a: --link glf1", ":0"]);
        // `a:` is a partial wildcard, which the option parser rejects.
        assert!(matches!(model, Err(LoadError::Unsupported(_))));
    }

    #[test]
    fn bad_body_lines() {
        let err = load_text(["bits:2", ":0", "1=0.5"]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { field: "weights", .. }));

        let err = load_text(["bits:2", ":0", "x:0.5"]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { field: "bucket", .. }));

        let err = load_text(["bits:2", ":0", "1:abc"]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { field: "weight", .. }));

        let err = load_text(["bits:2", ":0", "4:1.0"]).unwrap_err();
        assert!(matches!(err, LoadError::BucketOutOfRange { bucket: 4, table_size: 4 }));
    }

    #[test]
    fn bad_header_values() {
        let err = load_text(["bits:many", ":0"]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { field: "bits", .. }));

        let err = load_text(["bits:40", ":0"]).unwrap_err();
        assert!(matches!(err, LoadError::Unsupported(_)));
    }

    #[test]
    fn tolerates_blank_lines_and_crlf() {
        let model = load_text(["bits:2\r", ":0\r", "", "1:0.5\r", ""]).unwrap();
        assert_eq!(model.weight(1), 0.5);
    }

    #[test]
    fn roundtrip_through_writer() {
        let model = load_text(SAMPLE.lines()).unwrap();
        let mut out = Vec::new();
        write_text(&model, &mut out).unwrap();

        let reloaded = read_text(out.as_slice()).unwrap();
        assert_eq!(reloaded.header(), model.header());
        assert_eq!(reloaded.weights(), model.weights());
    }

    #[test]
    fn writer_emits_sparse_body() {
        let model = load_text(SAMPLE.lines()).unwrap();
        let mut out = Vec::new();
        write_text(&model, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let body: Vec<_> = text.lines().skip_while(|l| *l != SENTINEL).skip(1).collect();
        assert_eq!(body, vec!["3:0.532933", "15:-0.25"]);
    }
}
