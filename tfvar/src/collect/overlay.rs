//! The name-keyed overlay of candidate values.

use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use hcl::Structure;
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value as JsonValue;
use tracing::{debug, trace};

use super::{ENV_PREFIX, OverrideValue, Provenance, SourceExpression, lookup_tfvars_files};
use crate::config::is_json;
use crate::{ReadResultExt, TfvarError, TfvarResult};

/// One overlay slot: the winning value and where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayEntry {
    /// The candidate value.
    pub value: OverrideValue,
    /// Source kind, kept for logging.
    pub provenance: Provenance,
    /// File the value was read from, for file sources.
    pub path: Option<Utf8PathBuf>,
}

/// Candidate values keyed by variable name.
///
/// Each name holds exactly one value; inserting a name again replaces the
/// earlier value, so callers collect sources from lowest to highest
/// precedence.
///
/// # Examples
///
/// ```
/// use tfvar::collect::{Overlay, OverrideValue};
///
/// let mut overlay = Overlay::new();
/// overlay.collect_from_vars(["TF_VAR_region=eu-west-1", "HOME=/root"]);
/// overlay.collect_from_string("region=us-east-1")?;
/// assert_eq!(overlay.len(), 1);
/// assert!(matches!(
///     overlay.get("region"),
///     Some(OverrideValue::Raw { raw, .. }) if raw == "us-east-1"
/// ));
/// # Ok::<_, std::sync::Arc<tfvar::TfvarError>>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overlay {
    entries: BTreeMap<String, OverlayEntry>,
}

impl Overlay {
    /// Creates an empty overlay.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Stores `entry` for `name`, replacing any earlier entry.
    pub fn insert(&mut self, name: impl Into<String>, entry: OverlayEntry) {
        let key = name.into();
        if let Some(previous) = self.entries.get(&key) {
            trace!(
                name = %key,
                from = %previous.provenance,
                to = %entry.provenance,
                "value replaced"
            );
        }
        self.entries.insert(key, entry);
    }

    /// The value collected for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OverrideValue> {
        self.entries.get(name).map(|entry| &entry.value)
    }

    /// The full entry collected for `name`, if any.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&OverlayEntry> {
        self.entries.get(name)
    }

    /// Number of names with a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no value has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, OverlayEntry> {
        self.entries.iter()
    }

    /// Collects `TF_VAR_<name>` variables from the process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn collect_from_env(&mut self) {
        self.collect_from_vars(std::env::vars_os().filter_map(|(key, value)| {
            Some(format!("{}={}", key.to_str()?, value.to_str()?))
        }));
    }

    /// Collects `TF_VAR_<name>=<value>` entries from `vars`.
    ///
    /// Entries without the prefix, without `=`, or with an empty name are
    /// skipped. The value is everything after the first `=`.
    pub fn collect_from_vars<I>(&mut self, vars: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for var in vars {
            let Some((key, raw)) = var.as_ref().split_once('=') else {
                continue;
            };
            let Some(name) = key.strip_prefix(ENV_PREFIX).filter(|n| !n.is_empty()) else {
                continue;
            };
            debug!(name, "collected value from environment");
            self.insert_raw(name, raw, Provenance::Environment);
        }
    }

    /// Collects one `NAME=VALUE` string as given with `--var`.
    ///
    /// # Errors
    ///
    /// Returns [`TfvarError::MalformedOverrideString`] when `raw` has no `=`
    /// or the name before it is empty.
    pub fn collect_from_string(&mut self, raw: &str) -> TfvarResult<()> {
        let Some((name, value)) = raw.split_once('=').filter(|(n, _)| !n.is_empty()) else {
            return Err(Arc::new(TfvarError::MalformedOverrideString {
                raw: raw.to_owned(),
            }));
        };
        debug!(name, "collected value from command line");
        self.insert_raw(name, value, Provenance::Cli);
        Ok(())
    }

    /// Collects every attribute of the definitions file at `path`, as given
    /// with `--var-file`.
    ///
    /// # Errors
    ///
    /// Returns [`TfvarError::FileRead`] when the file cannot be read and
    /// [`TfvarError::Syntax`] when it is not a flat set of attributes.
    pub fn collect_from_file(&mut self, path: &Utf8Path) -> TfvarResult<()> {
        self.collect_file(path, Provenance::VarFile)
    }

    /// Collects the auto-discovered definitions files of `dir` in order.
    ///
    /// # Errors
    ///
    /// Fails like [`Overlay::collect_from_file`] for any discovered file,
    /// or with [`TfvarError::FileRead`] when `dir` cannot be listed.
    pub fn collect_from_auto_files(&mut self, dir: &Utf8Path) -> TfvarResult<()> {
        for path in lookup_tfvars_files(dir)? {
            self.collect_file(&path, Provenance::AutoFile)?;
        }
        Ok(())
    }

    fn insert_raw(&mut self, name: &str, raw: &str, provenance: Provenance) {
        self.insert(
            name,
            OverlayEntry {
                value: OverrideValue::Raw {
                    name: name.to_owned(),
                    raw: raw.to_owned(),
                },
                provenance,
                path: None,
            },
        );
    }

    fn collect_file(&mut self, path: &Utf8Path, provenance: Provenance) -> TfvarResult<()> {
        let source = std::fs::read_to_string(path).into_read_error(path)?;
        let values = if is_json(path) {
            json_attributes(path, &source)?
        } else {
            native_attributes(path, &source)?
        };
        debug!(path = %path, %provenance, count = values.len(), "collected values from file");
        for (name, expr) in values {
            self.insert(
                name,
                OverlayEntry {
                    value: OverrideValue::Expression(expr),
                    provenance,
                    path: Some(path.to_owned()),
                },
            );
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Overlay {
    type Item = (&'a String, &'a OverlayEntry);
    type IntoIter = btree_map::Iter<'a, String, OverlayEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn native_attributes(path: &Utf8Path, source: &str) -> TfvarResult<Vec<(String, SourceExpression)>> {
    let body = hcl::parse(source).map_err(|e| TfvarError::syntax(path, e.to_string()))?;
    let mut seen = BTreeSet::new();
    body.iter()
        .map(|structure| match structure {
            Structure::Attribute(attr) if !seen.insert(attr.key()) => Err(TfvarError::syntax(
                path,
                format!("the attribute \"{}\" is defined more than once", attr.key()),
            )),
            Structure::Attribute(attr) => Ok((
                attr.key().to_owned(),
                SourceExpression::Hcl(attr.expr().clone()),
            )),
            Structure::Block(block) => Err(TfvarError::syntax(
                path,
                format!(
                    "unexpected \"{}\" block; only variable assignments are allowed",
                    block.identifier()
                ),
            )),
        })
        .collect()
}

fn json_attributes(path: &Utf8Path, source: &str) -> TfvarResult<Vec<(String, SourceExpression)>> {
    let JsonAttributes(attrs) =
        serde_json::from_str(source).map_err(|e| TfvarError::syntax(path, e.to_string()))?;
    Ok(attrs
        .into_iter()
        .map(|(name, value)| (name, SourceExpression::Json(value)))
        .collect())
}

/// Top-level properties of a JSON definitions file in document order.
/// A property name given twice is an error.
struct JsonAttributes(Vec<(String, JsonValue)>);

impl<'de> Deserialize<'de> for JsonAttributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(JsonAttributesVisitor)
    }
}

struct JsonAttributesVisitor;

impl<'de> Visitor<'de> for JsonAttributesVisitor {
    type Value = JsonAttributes;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object whose properties are variable names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut seen = BTreeSet::new();
        let mut attrs = Vec::new();
        while let Some((name, value)) = map.next_entry::<String, JsonValue>()? {
            if !seen.insert(name.clone()) {
                return Err(de::Error::custom(format!(
                    "the property \"{name}\" is defined more than once"
                )));
            }
            attrs.push((name, value));
        }
        Ok(JsonAttributes(attrs))
    }
}
