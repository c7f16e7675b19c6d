//! Source identity derived from a sample's tags.
//!
//! An identity is the ordered tuple of the `deployment`, `job`, `index` and `ip`
//! tags. Every other tag is ignored, and tag values are compared byte for byte.
//!
//! Two textual forms exist:
//! - display name, `d0/j0/i0/0.0.0.0`, used in logs;
//! - key properties, `deployment=d0,job=j0,index=i0,ip=0.0.0.0`, the stable
//!   external key management clients match on. Values holding a reserved
//!   character are double-quoted with backslash escapes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{LastValueError, Result};

/// Required tag keys in canonical order.
pub const IDENTITY_TAGS: [&str; 4] = ["deployment", "job", "index", "ip"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity {
    deployment: Arc<str>,
    job: Arc<str>,
    index: Arc<str>,
    ip: Arc<str>,
}

impl Identity {
    pub fn new(
        deployment: impl Into<Arc<str>>,
        job: impl Into<Arc<str>>,
        index: impl Into<Arc<str>>,
        ip: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            deployment: deployment.into(),
            job: job.into(),
            index: index.into(),
            ip: ip.into(),
        }
    }

    /// Resolve from a tag map. Fails with `InvalidSample` naming the first
    /// missing tag in canonical order.
    pub fn from_tags(tags: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &'static str| {
            tags.get(key)
                .map(|v| Arc::<str>::from(v.as_str()))
                .ok_or(LastValueError::InvalidSample { missing: key })
        };
        Ok(Self {
            deployment: get("deployment")?,
            job: get("job")?,
            index: get("index")?,
            ip: get("ip")?,
        })
    }

    pub fn deployment(&self) -> &str { &self.deployment }
    pub fn job(&self) -> &str { &self.job }
    pub fn index(&self) -> &str { &self.index }
    pub fn ip(&self) -> &str { &self.ip }

    fn values(&self) -> [&str; 4] {
        [&self.deployment, &self.job, &self.index, &self.ip]
    }

    /// `deployment=..,job=..,index=..,ip=..` in canonical order.
    pub fn key_properties(&self) -> String {
        let mut out = String::new();
        for (i, (k, v)) in IDENTITY_TAGS.iter().zip(self.values()).enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(k);
            out.push('=');
            if needs_quoting(v) {
                quote(v, &mut out);
            } else {
                out.push_str(v);
            }
        }
        out
    }

    /// Parse the output of [`Identity::key_properties`]. Property order is not
    /// significant; unknown, duplicate, or missing keys are rejected.
    pub fn parse_key_properties(s: &str) -> Result<Self> {
        let mut slots: [Option<String>; 4] = Default::default();
        let mut rest = s;

        loop {
            let (key, after_key) = rest
                .split_once('=')
                .ok_or_else(|| bad_key(s, "expected key=value"))?;
            let slot = IDENTITY_TAGS
                .iter()
                .position(|k| *k == key)
                .ok_or_else(|| bad_key(s, "unknown property"))?;
            if slots[slot].is_some() {
                return Err(bad_key(s, "duplicate property"));
            }

            let (value, after_value) = if after_key.starts_with('"') {
                unquote(&after_key[1..]).ok_or_else(|| bad_key(s, "unterminated quote"))?
            } else {
                let end = after_key.find(',').unwrap_or(after_key.len());
                let raw = &after_key[..end];
                if raw.is_empty() || needs_quoting(raw) {
                    return Err(bad_key(s, "invalid unquoted value"));
                }
                (raw.to_string(), &after_key[end..])
            };
            slots[slot] = Some(value);

            match after_value.strip_prefix(',') {
                Some(next) => rest = next,
                None if after_value.is_empty() => break,
                None => return Err(bad_key(s, "expected ',' after value")),
            }
        }

        let [Some(deployment), Some(job), Some(index), Some(ip)] = slots else {
            return Err(bad_key(s, "missing property"));
        };
        Ok(Self::new(deployment, job, index, ip))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.deployment, self.job, self.index, self.ip)
    }
}

fn bad_key(s: &str, why: &str) -> LastValueError {
    LastValueError::BadRequest(format!("invalid identity key `{s}`: {why}"))
}

fn needs_quoting(v: &str) -> bool {
    v.is_empty()
        || v
            .chars()
            .any(|c| matches!(c, ',' | '=' | ':' | '"' | '*' | '?' | '\\' | '\n'))
}

/// Quoted form: surrounding `"`, with `\\`, `\"`, `\*`, `\?` and `\n` escapes.
fn quote(v: &str, out: &mut String) {
    out.push('"');
    for c in v.chars() {
        match c {
            '\\' | '"' | '*' | '?' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

/// Reads a quoted value whose opening `"` is already consumed.
/// Returns the unescaped value and the remainder after the closing quote.
fn unquote(s: &str) -> Option<(String, &str)> {
    let mut out = String::new();
    let mut chars = s.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((out, &s[i + 1..])),
            '\\' => match chars.next()?.1 {
                'n' => out.push('\n'),
                e @ ('\\' | '"' | '*' | '?') => out.push(e),
                _ => return None,
            },
            _ => out.push(c),
        }
    }
    None
}
