//! Hierarchy tracker: the chain of tags from level 1 down to the current line.

/// A line whose parent level has not been seen in the current record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orphan {
    /// The level that would have had to appear first.
    pub missing_level: u32,
}

/// Tags seen at each level of the record being built.
///
/// Entry `k` holds the tag of the most recent level-`k + 1` line; level 0
/// never contributes to a path, it starts the record instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lineage {
    tags: Vec<String>,
}

impl Lineage {
    /// An empty lineage, as at the start of a record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every tag (a new level-0 line was seen).
    pub fn reset(&mut self) {
        self.tags.clear();
    }

    /// Deepest level currently on the stack (0 when empty).
    pub fn depth(&self) -> u32 {
        u32::try_from(self.tags.len()).unwrap_or(u32::MAX)
    }

    /// Record `tag` at `level` and return the tag path for that line.
    ///
    /// Everything deeper than `level` is dropped first. Fails without
    /// touching the stack when no tag has been seen at `level - 1`.
    ///
    /// `level` must be at least 1.
    pub fn descend(&mut self, level: u32, tag: &str, separator: &str) -> Result<String, Orphan> {
        debug_assert!(level >= 1, "level-0 lines start records, they do not descend");
        let parent = level.saturating_sub(1);
        if parent > self.depth() {
            return Err(Orphan {
                missing_level: parent,
            });
        }
        self.tags.truncate(parent as usize);
        self.tags.push(tag.to_string());
        Ok(self.path(separator))
    }

    /// Tag path of the ancestor at `level`, if it is on the stack.
    ///
    /// `path_at(0, _)` is `None`: the record line has no path.
    pub fn path_at(&self, level: u32, separator: &str) -> Option<String> {
        if level == 0 || level > self.depth() {
            return None;
        }
        Some(join(&self.tags[..level as usize], separator))
    }

    fn path(&self, separator: &str) -> String {
        join(&self.tags, separator)
    }
}

/// Join non-empty tags; level-only lines hold a level without naming it.
fn join(tags: &[String], separator: &str) -> String {
    let mut out = String::new();
    for tag in tags.iter().filter(|t| !t.is_empty()) {
        if !out.is_empty() {
            out.push_str(separator);
        }
        out.push_str(tag);
    }
    out
}
