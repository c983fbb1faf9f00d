//! Top-K vocabularies over categorical terms, and their encoding.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use dropout_ingest::TermRecord;
use dropout_model::{StudyId, TermField, TermFlags, TopKVocabulary};

use crate::text::normalize_term;

/// Fits the `k` most frequent normalized terms.
///
/// Frequencies count rows. Equal frequencies keep first-seen order, so the
/// result is deterministic for a given input order.
pub fn fit_vocabulary<'a>(
    field: TermField,
    terms: impl IntoIterator<Item = Option<&'a str>>,
    k: usize,
) -> TopKVocabulary {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for term in terms.into_iter().flatten().filter_map(normalize_term) {
        let first_seen = counts.len();
        counts.entry(term).or_insert((0, first_seen)).0 += 1;
    }
    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(term, (count, first_seen))| (term, count, first_seen))
        .collect();
    ranked.sort_by_key(|(_, count, first_seen)| (Reverse(*count), *first_seen));
    let terms = ranked.into_iter().take(k).map(|(term, _, _)| term).collect();
    TopKVocabulary::new(field, terms)
}

/// Fits a vocabulary over the term column of a record set.
pub fn fit_terms(field: TermField, records: &[TermRecord], k: usize) -> TopKVocabulary {
    fit_vocabulary(field, records.iter().map(|r| r.term.as_deref()), k)
}

/// Normalizes `raw` and returns it when it belongs to the vocabulary.
pub fn encode(vocabulary: &TopKVocabulary, raw: &str) -> Option<String> {
    normalize_term(raw).filter(|term| vocabulary.contains(term))
}

/// Vocabulary flags per study.
///
/// Every study with at least one record gets an entry, possibly empty.
pub fn term_flags(
    records: &[TermRecord],
    vocabulary: &TopKVocabulary,
) -> BTreeMap<StudyId, TermFlags> {
    let mut flags: BTreeMap<StudyId, TermFlags> = BTreeMap::new();
    for record in records {
        let study = flags.entry(record.study_id.clone()).or_default();
        if let Some(term) = record.term.as_deref().and_then(|raw| encode(vocabulary, raw)) {
            study.insert(term);
        }
    }
    flags
}
