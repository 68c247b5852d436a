//! Tag-set model and the registry that assigns dense ids.

use std::collections::HashMap;
use std::fmt;

use tsload_common::TagId;

/// Number of attributes in a tag-set.
pub const TAG_ATTRIBUTE_COUNT: usize = 10;

/// Attribute keys in the order they appear on a tag line and in the tags table.
pub const TAG_KEYS: [&str; TAG_ATTRIBUTE_COUNT] = [
    "hostname",
    "region",
    "datacenter",
    "rack",
    "os",
    "arch",
    "team",
    "service",
    "service_version",
    "service_environment",
];

/// The fixed 10-attribute descriptor of a simulated host/service.
///
/// Equality and hashing are structural over all ten fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub hostname: String,
    pub region: String,
    pub datacenter: String,
    pub rack: String,
    pub os: String,
    pub arch: String,
    pub team: String,
    pub service: String,
    pub service_version: String,
    pub service_environment: String,
}

impl Tag {
    /// Build a tag from attribute values ordered as [`TAG_KEYS`].
    pub fn from_values(values: [String; TAG_ATTRIBUTE_COUNT]) -> Self {
        let [
            hostname,
            region,
            datacenter,
            rack,
            os,
            arch,
            team,
            service,
            service_version,
            service_environment,
        ] = values;
        Tag {
            hostname,
            region,
            datacenter,
            rack,
            os,
            arch,
            team,
            service,
            service_version,
            service_environment,
        }
    }

    /// Attribute values ordered as [`TAG_KEYS`].
    pub fn values(&self) -> [&str; TAG_ATTRIBUTE_COUNT] {
        [
            self.hostname.as_str(),
            self.region.as_str(),
            self.datacenter.as_str(),
            self.rack.as_str(),
            self.os.as_str(),
            self.arch.as_str(),
            self.team.as_str(),
            self.service.as_str(),
            self.service_version.as_str(),
            self.service_environment.as_str(),
        ]
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in TAG_KEYS.iter().zip(self.values()).enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// Deduplicates tag-sets into ids assigned in first-seen order starting at 1.
///
/// Ids are never reused or renumbered for the lifetime of the registry.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    ids: HashMap<Tag, TagId>,
    // Index i holds the tag with id i + 1.
    tags: Vec<Tag>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `tag`, allocating the next one if it is new.
    pub fn resolve(&mut self, tag: Tag) -> TagId {
        if let Some(id) = self.ids.get(&tag) {
            return *id;
        }
        let id = self.last_id().map_or(TagId::FIRST, TagId::next);
        self.tags.push(tag.clone());
        self.ids.insert(tag, id);
        id
    }

    /// Id of an already registered tag.
    pub fn get(&self, tag: &Tag) -> Option<TagId> {
        self.ids.get(tag).copied()
    }

    /// Tag registered under `id`.
    pub fn tag(&self, id: TagId) -> Option<&Tag> {
        let index = id.get().checked_sub(1)?;
        self.tags.get(usize::try_from(index).ok()?)
    }

    /// Highest id handed out so far, if any.
    pub fn last_id(&self) -> Option<TagId> {
        (!self.tags.is_empty()).then(|| TagId::from(self.tags.len() as u64))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Registered tags in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TagId, &Tag)> + '_ {
        self.tags
            .iter()
            .enumerate()
            .map(|(i, tag)| (TagId::from(i as u64 + 1), tag))
    }
}

#[cfg(test)]
pub(crate) fn sample_tag(host: &str) -> Tag {
    Tag::from_values([
        host.to_string(),
        "eu-west-1".to_string(),
        "eu-west-1b".to_string(),
        "5".to_string(),
        "Ubuntu16.04LTS".to_string(),
        "x64".to_string(),
        "NYC".to_string(),
        "9".to_string(),
        "1".to_string(),
        "test".to_string(),
    ])
}
