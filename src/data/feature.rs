//! Features and namespaces of a scoring request.

use super::cache::HashCache;
use super::RequestError;
use crate::model::DEFAULT_NAMESPACE;

// =============================================================================
// Feature
// =============================================================================

/// A single sparse feature.
///
/// A feature whose name consists only of ASCII digits carries an integer id,
/// as VW's parser does: outside `--hash all` mode such a feature hashes to
/// `id + namespace_hash` instead of a Murmur hash of its name.
#[derive(Debug, Clone)]
pub struct Feature {
    name: String,
    integer_id: Option<i32>,
    value: f32,
    hash: HashCache,
}

impl Feature {
    /// Feature with value 1.0.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_value(name, 1.0)
    }

    pub fn with_value(name: impl Into<String>, value: f32) -> Self {
        let name = name.into();
        let integer_id = parse_integer_name(&name);
        Self {
            name,
            integer_id,
            value,
            hash: HashCache::new(),
        }
    }

    /// Integer-named feature with value 1.0.
    pub fn from_id(id: i32) -> Self {
        Self::from_id_with_value(id, 1.0)
    }

    pub fn from_id_with_value(id: i32, value: f32) -> Self {
        Self {
            name: id.to_string(),
            integer_id: Some(id),
            value,
            hash: HashCache::new(),
        }
    }

    /// Parse a `name` or `name:value` token.
    pub fn parse(token: &str) -> Result<Self, RequestError> {
        let mut parts = token.split(':');
        let name = parts.next().unwrap_or_default();
        match parts.next() {
            None => Ok(Self::new(name)),
            Some(value) => {
                let value = value.parse::<f32>().map_err(|e| RequestError::InvalidWeight {
                    token: token.to_string(),
                    message: e.to_string(),
                })?;
                Ok(Self::with_value(name, value))
            }
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Integer id if the feature name is purely numeric.
    #[inline]
    pub fn integer_id(&self) -> Option<i32> {
        self.integer_id
    }

    #[inline]
    pub fn has_integer_name(&self) -> bool {
        self.integer_id.is_some()
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_value(&mut self, value: f32) {
        self.value = value;
    }

    /// Change the name and drop the cached hash.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.integer_id = parse_integer_name(&self.name);
        self.hash.clear();
    }

    /// Hash computed by the last scoring call, if any.
    #[inline]
    pub fn cached_hash(&self) -> Option<i32> {
        self.hash.get()
    }

    #[inline]
    pub(crate) fn hash_cache(&self) -> &HashCache {
        &self.hash
    }
}

/// Decimal value of an all-digit name, wrapping at 32 bits like VW's parser.
fn parse_integer_name(name: &str) -> Option<i32> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let id = name
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(10).wrapping_add((b - b'0') as u32));
    Some(id as i32)
}

// =============================================================================
// Namespace
// =============================================================================

/// A named group of features.
///
/// Interaction matching only looks at the first character of the name.
#[derive(Debug, Clone)]
pub struct Namespace {
    name: String,
    features: Vec<Feature>,
    hash: HashCache,
}

impl Namespace {
    pub fn new(name: impl Into<String>, features: impl IntoIterator<Item = Feature>) -> Self {
        let namespace = Self {
            name: name.into(),
            features: features.into_iter().collect(),
            hash: HashCache::new(),
        };
        namespace.reset_hashes();
        namespace
    }

    /// Namespace without features.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, std::iter::empty())
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Mutable access to the features. Use [`Feature::rename`] to change a
    /// name so its cached hash is dropped.
    #[inline]
    pub fn features_mut(&mut self) -> &mut [Feature] {
        &mut self.features
    }

    /// Append a feature. Any hash it cached under another namespace is dropped.
    pub fn push(&mut self, feature: Feature) {
        feature.hash.clear();
        self.features.push(feature);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Change the name, dropping the namespace hash and every feature hash
    /// derived from it.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.reset_hashes();
    }

    /// Drop all cached hashes in this namespace.
    pub fn reset_hashes(&self) {
        self.hash.clear();
        for feature in &self.features {
            feature.hash.clear();
        }
    }

    /// Character used to match interaction pairs.
    ///
    /// An empty name stands for VW's default namespace.
    #[inline]
    pub fn interaction_key(&self) -> char {
        self.name.chars().next().unwrap_or(DEFAULT_NAMESPACE)
    }

    #[inline]
    pub fn cached_hash(&self) -> Option<i32> {
        self.hash.get()
    }

    #[inline]
    pub(crate) fn hash_cache(&self) -> &HashCache {
        &self.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("42", Some(42))]
    #[case("0", Some(0))]
    #[case("007", Some(7))]
    #[case("4294967295", Some(-1))]
    #[case("4294967338", Some(42))]
    #[case("-5", None)]
    #[case("4.2", None)]
    #[case("x42", None)]
    #[case("", None)]
    fn integer_names(#[case] name: &str, #[case] id: Option<i32>) {
        assert_eq!(Feature::new(name).integer_id(), id);
    }

    #[test]
    fn from_id_keeps_decimal_name() {
        let f = Feature::from_id(42);
        assert_eq!(f.name(), "42");
        assert_eq!(f.integer_id(), Some(42));
        assert_eq!(f.value(), 1.0);
    }

    #[test]
    fn parse_with_and_without_value() {
        let f = Feature::parse("odd=-1").unwrap();
        assert_eq!(f.name(), "odd=-1");
        assert_eq!(f.value(), 1.0);

        let f = Feature::parse("numa:2").unwrap();
        assert_eq!(f.name(), "numa");
        assert_eq!(f.value(), 2.0);

        let f = Feature::parse("w:-0.5").unwrap();
        assert_eq!(f.value(), -0.5);
    }

    #[test]
    fn parse_rejects_bad_value() {
        let err = Feature::parse("a:").unwrap_err();
        assert!(matches!(err, RequestError::InvalidWeight { ref token, .. } if token == "a:"));
        assert!(Feature::parse("a:xyz").is_err());
    }

    #[test]
    fn rename_clears_hash() {
        let mut f = Feature::new("a");
        f.hash_cache().set(5);
        f.rename("17");
        assert_eq!(f.cached_hash(), None);
        assert_eq!(f.integer_id(), Some(17));
    }

    #[test]
    fn namespace_rename_clears_feature_hashes() {
        let mut ns = Namespace::new("a", [Feature::new("x"), Feature::new("y")]);
        ns.hash_cache().set(1);
        for f in ns.features() {
            f.hash_cache().set(2);
        }
        ns.rename("b");
        assert_eq!(ns.name(), "b");
        assert_eq!(ns.cached_hash(), None);
        assert!(ns.features().iter().all(|f| f.cached_hash().is_none()));
    }

    #[test]
    fn clone_and_push_drop_cached_hashes() {
        let ns = Namespace::new("a", [Feature::new("x")]);
        ns.hash_cache().set(1);
        ns.features()[0].hash_cache().set(2);

        let copy = ns.clone();
        assert_eq!(copy.cached_hash(), None);
        assert_eq!(copy.features()[0].cached_hash(), None);

        let moved = Feature::new("y");
        moved.hash_cache().set(3);
        let mut other = Namespace::empty("b");
        other.push(moved);
        assert_eq!(other.features()[0].cached_hash(), None);
    }

    #[test]
    fn interaction_key_defaults_for_empty_name() {
        assert_eq!(Namespace::empty("user").interaction_key(), 'u');
        assert_eq!(Namespace::empty("").interaction_key(), ' ');
    }
}
