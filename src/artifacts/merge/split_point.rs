//! Split point (merge-base) discovery
//!
//! The split point of two commits is a common ancestor that has no descendant which is also a
//! common ancestor. It is found in two passes over the commit graph:
//!
//! 1. BFS from the first tip, marking every ancestor as visited from the source side.
//! 2. BFS from the second tip. The first time the walk steps onto a source-side commit, that
//!    commit becomes a candidate and the walk does not expand past it.
//!
//! Pass 2 can still collect candidates that are ancestors of other candidates (a short path to an
//! old commit next to a long path to a newer one). Those are filtered out, and the first remaining
//! candidate in the order the second walk met them wins.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let finder = SplitPointFinder::new(|oid| database.get_slim_commit(oid));
//! let split_point = finder.find_split_point(&head_oid, &other_oid)?;
//! ```

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    struct VisitState: u8 {
        const NONE = 0b0000;
        const VISITED_FROM_SOURCE = 0b0001;
        const VISITED_FROM_TARGET = 0b0010;
        /// Reached while walking the ancestry of another candidate
        const STALE = 0b0100;
        /// Common ancestor first reached by the target-side walk
        const RESULT = 0b1000;
    }
}

impl fmt::Debug for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(VisitState::VISITED_FROM_SOURCE) {
            flags.push("SOURCE");
        }
        if self.contains(VisitState::VISITED_FROM_TARGET) {
            flags.push("TARGET");
        }
        if self.contains(VisitState::STALE) {
            flags.push("STALE");
        }
        if self.contains(VisitState::RESULT) {
            flags.push("RESULT");
        }
        if flags.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}

/// Finds the split point of two commits
///
/// Generic over the commit loader so the same traversal runs against the object store or an
/// in-memory graph. The loader must return the parents of any commit reachable from the tips.
pub struct SplitPointFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    commit_loader: CommitLoaderFn,
}

impl<CommitLoaderFn> SplitPointFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    pub fn new(commit_loader: CommitLoaderFn) -> Self {
        Self { commit_loader }
    }

    /// Returns `None` only when the two histories share no commit at all
    pub fn find_split_point(
        &self,
        source_commit_id: &ObjectId,
        target_commit_id: &ObjectId,
    ) -> anyhow::Result<Option<ObjectId>> {
        if source_commit_id == target_commit_id {
            return Ok(Some(source_commit_id.clone()));
        }

        let mut states = self.mark_source_ancestors(source_commit_id)?;
        let candidates = self.collect_candidates(target_commit_id, &mut states)?;

        tracing::debug!(
            source = %source_commit_id,
            target = %target_commit_id,
            candidates = ?candidates.iter().map(ObjectId::to_short_oid).collect::<Vec<_>>(),
            "collected split point candidates"
        );

        if candidates.len() <= 1 {
            return Ok(candidates.into_iter().next());
        }

        let redundant = self.find_redundant(&candidates)?;
        tracing::debug!(
            redundant = ?redundant.iter().map(ObjectId::to_short_oid).collect::<Vec<_>>(),
            "filtered redundant split point candidates"
        );

        Ok(candidates
            .into_iter()
            .find(|candidate| !redundant.contains(candidate)))
    }

    /// Pass 1: every ancestor of the source tip, each visited once
    fn mark_source_ancestors(
        &self,
        source_commit_id: &ObjectId,
    ) -> anyhow::Result<HashMap<ObjectId, VisitState>> {
        let mut states = HashMap::from([(
            source_commit_id.clone(),
            VisitState::VISITED_FROM_SOURCE,
        )]);
        let mut queue = VecDeque::from([source_commit_id.clone()]);

        while let Some(commit_id) = queue.pop_front() {
            let commit = (self.commit_loader)(&commit_id)?;

            for parent_id in commit.parents {
                if !states.contains_key(&parent_id) {
                    states.insert(parent_id.clone(), VisitState::VISITED_FROM_SOURCE);
                    queue.push_back(parent_id);
                }
            }
        }

        Ok(states)
    }

    /// Pass 2: common ancestors in the order the target-side BFS reaches them
    fn collect_candidates(
        &self,
        target_commit_id: &ObjectId,
        states: &mut HashMap<ObjectId, VisitState>,
    ) -> anyhow::Result<Vec<ObjectId>> {
        let mut candidates = Vec::new();
        let mut queue = VecDeque::from([target_commit_id.clone()]);
        states
            .entry(target_commit_id.clone())
            .or_insert(VisitState::NONE)
            .insert(VisitState::VISITED_FROM_TARGET);

        while let Some(commit_id) = queue.pop_front() {
            let state = states.get(&commit_id).copied().unwrap_or(VisitState::NONE);

            if state.contains(VisitState::VISITED_FROM_SOURCE) {
                states.insert(commit_id.clone(), state | VisitState::RESULT);
                candidates.push(commit_id);
                continue;
            }

            let commit = (self.commit_loader)(&commit_id)?;
            for parent_id in commit.parents {
                let parent_state = states.entry(parent_id.clone()).or_insert(VisitState::NONE);
                if !parent_state.contains(VisitState::VISITED_FROM_TARGET) {
                    parent_state.insert(VisitState::VISITED_FROM_TARGET);
                    queue.push_back(parent_id);
                }
            }
        }

        Ok(candidates)
    }

    /// Candidates reachable from another candidate's parents
    fn find_redundant(&self, candidates: &[ObjectId]) -> anyhow::Result<HashSet<ObjectId>> {
        let candidate_set = candidates.iter().collect::<HashSet<_>>();
        let mut redundant = HashSet::new();
        let mut stale = HashMap::<ObjectId, VisitState>::new();

        for candidate in candidates {
            if redundant.contains(candidate) {
                continue;
            }

            let mut queue = VecDeque::from([candidate.clone()]);
            while let Some(commit_id) = queue.pop_front() {
                let commit = (self.commit_loader)(&commit_id)?;

                for parent_id in commit.parents {
                    if candidate_set.contains(&parent_id) {
                        redundant.insert(parent_id.clone());
                    }

                    let state = stale.entry(parent_id.clone()).or_insert(VisitState::NONE);
                    if !state.contains(VisitState::STALE) {
                        state.insert(VisitState::STALE);
                        queue.push_back(parent_id);
                    }
                }
            }
        }

        Ok(redundant)
    }
}
