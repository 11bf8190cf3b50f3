//! ActivationEngine: iterative fixed-point selection of lore entries.
//!
//! Pass 0 evaluates every entry against the base context; entries that
//! fire feed an accumulating recursion context that later passes match
//! against, until a pass adds nothing new or the recursion limit is hit.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, info};

use loreweave_core::constants::DEFAULT_RECURSION_LIMIT;
use loreweave_core::errors::VectorSearchError;
use loreweave_core::models::{ActivationMode, LoreEntry, LoreSource};

use crate::trigger::keyword_triggered;

/// Semantic-similarity trigger callback.
///
/// Invoked at most once per activation run, with every pooled entry and
/// the base context text. The returned set holds the `index` values of
/// entries considered hits. A failure aborts the whole run.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    async fn search(
        &self,
        entries: &[LoreEntry],
        context_text: &str,
    ) -> Result<HashSet<i64>, VectorSearchError>;
}

struct Candidate {
    entry: LoreEntry,
    source: LoreSource,
    seq: usize,
}

/// The lore activation engine. Configure with the `with_*` builders, then
/// call [`ActivationEngine::activate`] once per build.
pub struct ActivationEngine<'a> {
    vector_search: Option<&'a dyn VectorSearch>,
    recursion_limit: usize,
    rng: Option<Box<dyn FnMut() -> f64 + Send + 'a>>,
    default_case_sensitive: bool,
}

impl<'a> Default for ActivationEngine<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ActivationEngine<'a> {
    pub fn new() -> Self {
        Self {
            vector_search: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            rng: None,
            default_case_sensitive: false,
        }
    }

    /// Enable vector-mode entries through the given callback.
    pub fn with_vector_search(mut self, vs: &'a dyn VectorSearch) -> Self {
        self.vector_search = Some(vs);
        self
    }

    /// Maximum number of re-evaluation passes after pass 0.
    /// Zero disables recursion entirely.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Inject a probability roll source returning uniform `[0, 1)` values.
    /// Defaults to the thread RNG.
    pub fn with_rng(mut self, rng: impl FnMut() -> f64 + Send + 'a) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    /// Default keyword case sensitivity for entries without an override.
    pub fn with_default_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.default_case_sensitive = case_sensitive;
        self
    }

    /// Compute the activated entries for one build, in final order:
    /// ascending `order`, ties broken global-before-character, then by
    /// original within-pool sequence.
    pub async fn activate(
        &mut self,
        context_text: &str,
        global_entries: &[LoreEntry],
        character_entries: &[LoreEntry],
    ) -> Result<Vec<LoreEntry>, VectorSearchError> {
        let mut pool: Vec<Candidate> = Vec::with_capacity(global_entries.len() + character_entries.len());
        for (seq, entry) in global_entries.iter().enumerate() {
            pool.push(Candidate {
                entry: entry.clone(),
                source: LoreSource::Global,
                seq,
            });
        }
        for (seq, entry) in character_entries.iter().enumerate() {
            pool.push(Candidate {
                entry: entry.clone(),
                source: LoreSource::Character,
                seq,
            });
        }

        // The single awaited call site: at most one vector search per run,
        // and nothing else proceeds until it resolves.
        let vector_hits: HashSet<i64> = match self.vector_search {
            Some(vs) => {
                let entries: Vec<LoreEntry> = pool.iter().map(|c| c.entry.clone()).collect();
                vs.search(&entries, context_text).await?
            }
            None => HashSet::new(),
        };

        let mut resolved_indices: HashSet<i64> = HashSet::new();
        let mut prob_failed: HashSet<i64> = HashSet::new();
        let mut accepted: Vec<(LoreEntry, LoreSource, usize)> = Vec::new();
        let mut recursion_context = context_text.to_string();

        for pass in 0..=self.recursion_limit {
            let mut any_new = false;

            for candidate in &pool {
                let entry = &candidate.entry;
                if resolved_indices.contains(&entry.index) || prob_failed.contains(&entry.index) {
                    continue;
                }
                if !self.fires(entry, pass, context_text, &recursion_context, &vector_hits) {
                    continue;
                }

                if !self.pass_probability(entry) {
                    // A failed roll is permanent: the entry is never retried.
                    prob_failed.insert(entry.index);
                    continue;
                }

                resolved_indices.insert(entry.index);
                accepted.push((entry.clone(), candidate.source, candidate.seq));
                any_new = true;

                if !entry.prevent_recursion && !entry.content.is_empty() {
                    if recursion_context.is_empty() {
                        recursion_context = entry.content.clone();
                    } else {
                        recursion_context.push('\n');
                        recursion_context.push_str(&entry.content);
                    }
                }
            }

            debug!(pass, fired = accepted.len(), "activation pass complete");
            if !any_new {
                break;
            }
        }

        accepted.sort_by(|a, b| {
            a.0
                .order
                .total_cmp(&b.0.order)
                .then(a.1.cmp(&b.1))
                .then(a.2.cmp(&b.2))
        });

        info!(
            pool = pool.len(),
            activated = accepted.len(),
            "lore activation complete"
        );

        Ok(accepted.into_iter().map(|(entry, _, _)| entry).collect())
    }

    fn fires(
        &self,
        entry: &LoreEntry,
        pass: usize,
        base_context: &str,
        recursion_context: &str,
        vector_hits: &HashSet<i64>,
    ) -> bool {
        if !entry.enabled {
            return false;
        }
        // exclude_recursion entries only ever see the base context.
        let ctx = if pass > 0 && entry.exclude_recursion {
            base_context
        } else {
            recursion_context
        };
        let case_sensitive = entry.case_sensitive.unwrap_or(self.default_case_sensitive);

        match entry.activation_mode {
            ActivationMode::Always => true,
            ActivationMode::Keyword => keyword_triggered(entry, ctx, case_sensitive),
            ActivationMode::Vector => vector_hits.contains(&entry.index),
        }
    }

    fn pass_probability(&mut self, entry: &LoreEntry) -> bool {
        let p = entry.normalized_probability();
        if p >= 100.0 {
            return true;
        }
        if p <= 0.0 {
            return false;
        }
        let roll = match &mut self.rng {
            Some(rng) => rng(),
            None => rand::random::<f64>(),
        };
        roll * 100.0 < p
    }
}
