use serde::{Deserialize, Serialize};

/// The four sequential snapshots of a pipeline run.
///
/// `after_pre_regex` is structurally retained and always equals `raw`;
/// the stage naming predates the macro-first pipeline and is kept so
/// callers can address stages uniformly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stages<T> {
    pub raw: T,
    pub after_pre_regex: T,
    pub after_macro: T,
    pub after_post_regex: T,
}

impl<T> Stages<T> {
    /// Apply `f` to every stage, preserving stage order.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Stages<U> {
        Stages {
            raw: f(self.raw),
            after_pre_regex: f(self.after_pre_regex),
            after_macro: f(self.after_macro),
            after_post_regex: f(self.after_post_regex),
        }
    }

    /// Borrowing variant of [`Stages::map`].
    pub fn map_ref<U>(&self, mut f: impl FnMut(&T) -> U) -> Stages<U> {
        Stages {
            raw: f(&self.raw),
            after_pre_regex: f(&self.after_pre_regex),
            after_macro: f(&self.after_macro),
            after_post_regex: f(&self.after_post_regex),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_visits_stages_in_pipeline_order() {
        let stages = Stages {
            raw: "raw",
            after_pre_regex: "pre",
            after_macro: "macro",
            after_post_regex: "post",
        };
        let mut visited = Vec::new();
        let mapped = stages.map(|s| {
            visited.push(s);
            s.len()
        });
        assert_eq!(visited, ["raw", "pre", "macro", "post"]);
        assert_eq!(mapped.raw, 3);
        assert_eq!(mapped.after_post_regex, 4);
    }
}
