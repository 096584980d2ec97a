//! Resolve a `--worker` argument to a roster entry.

use anyhow::{Result, anyhow};
use ferias_core::worker::Worker;
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};

/// Exact identifier first, then the best fuzzy match on the name.
pub fn resolve_worker<'a>(workers: &'a [Worker], query: &str) -> Result<&'a Worker> {
  if let Some(w) = workers.iter().find(|w| w.id == query) {
    return Ok(w);
  }
  let matcher = SkimMatcherV2::default().ignore_case();
  workers
    .iter()
    .filter_map(|w| matcher.fuzzy_match(&w.name, query).map(|score| (score, w)))
    .max_by_key(|(score, _)| *score)
    .map(|(_, w)| w)
    .ok_or_else(|| anyhow!("no worker matches {query:?}"))
}

/// Exact identifier only. The error names the closest name match as a hint.
pub fn find_exact<'a>(workers: &'a [Worker], id: &str) -> Result<&'a Worker> {
  if let Some(w) = workers.iter().find(|w| w.id == id) {
    return Ok(w);
  }
  match resolve_worker(workers, id) {
    Ok(w) => Err(anyhow!(
      "no worker with id {id:?}; did you mean {} ({})?",
      w.id,
      w.name
    )),
    Err(_) => Err(anyhow!("no worker with id {id:?}")),
  }
}
