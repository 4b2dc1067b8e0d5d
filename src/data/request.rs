//! Scoring requests and the compact VW text form.

use std::str::FromStr;

use super::feature::{Feature, Namespace};
use super::RequestError;

/// One example to score: an ordered list of namespaces.
///
/// Built fresh per query. Scoring only writes the lazily cached hashes of its
/// namespaces and features; call [`Request::reset_hashes`] before reusing a
/// request against a model with a different hash seed or hash mode.
///
/// # Example
///
/// ```
/// use vw_slim::data::{Feature, Namespace, Request};
///
/// let parsed: Request = "1 |a x z:0.5 |b x1".parse().unwrap();
///
/// let built = Request::new([
///     Namespace::new("a", [Feature::new("x"), Feature::with_value("z", 0.5)]),
///     Namespace::new("b", [Feature::new("x1")]),
/// ]);
///
/// assert_eq!(parsed.namespaces().len(), built.namespaces().len());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Request {
    namespaces: Vec<Namespace>,
    probabilities: bool,
}

impl Request {
    pub fn new(namespaces: impl IntoIterator<Item = Namespace>) -> Self {
        Self {
            namespaces: namespaces.into_iter().collect(),
            probabilities: false,
        }
    }

    /// Parse `"[label] |ns f1 f2:weight ... |ns2 ..."`.
    ///
    /// Tokens before the first `|` token are a label or tag and are ignored.
    /// A `|`-prefixed token opens a namespace named by the rest of the token.
    pub fn parse(line: &str) -> Result<Self, RequestError> {
        let mut namespaces: Vec<Namespace> = Vec::new();
        for token in line.split_whitespace() {
            if let Some(name) = token.strip_prefix('|') {
                namespaces.push(Namespace::empty(name));
            } else if let Some(current) = namespaces.last_mut() {
                current.push(Feature::parse(token)?);
            }
        }
        Ok(Self::new(namespaces))
    }

    /// Request normalized probabilities instead of the model's link output.
    pub fn with_probabilities(mut self, probabilities: bool) -> Self {
        self.probabilities = probabilities;
        self
    }

    pub fn set_probabilities(&mut self, probabilities: bool) {
        self.probabilities = probabilities;
    }

    #[inline]
    pub fn wants_probabilities(&self) -> bool {
        self.probabilities
    }

    #[inline]
    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    #[inline]
    pub fn namespaces_mut(&mut self) -> &mut [Namespace] {
        &mut self.namespaces
    }

    pub fn push(&mut self, namespace: Namespace) {
        self.namespaces.push(namespace);
    }

    /// Total number of features across namespaces.
    pub fn num_features(&self) -> usize {
        self.namespaces.iter().map(Namespace::len).sum()
    }

    /// Drop every cached namespace and feature hash.
    pub fn reset_hashes(&self) {
        for namespace in &self.namespaces {
            namespace.reset_hashes();
        }
    }
}

impl FromStr for Request {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
