use crate::error::OraResult;
use crate::search::store::IndexStore;
use std::sync::Arc;
use tracing::debug;

/// A conjunction of substring clauses: a document matches only if every
/// clause matches somewhere in its name or content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConjunctiveQuery {
    terms: Vec<String>,
}

impl ConjunctiveQuery {
    /// Splits `phrase` on whitespace, one substring clause per term. There is
    /// no quoting, escaping or stemming.
    pub fn parse(phrase: &str) -> Self {
        Self {
            terms: phrase.split_whitespace().map(str::to_owned).collect(),
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// FTS5 expression for the clauses the trigram index can answer: every
    /// term of at least three characters, quoted as a literal and joined with
    /// `AND`.
    pub fn match_expression(&self) -> Option<String> {
        let phrases: Vec<String> = self
            .terms
            .iter()
            .filter(|term| is_trigram_term(term))
            .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
            .collect();

        (!phrases.is_empty()).then(|| phrases.join(" AND "))
    }

    /// `LIKE` patterns (`%term%`, with `\` as the escape character) for terms too
    /// short to produce a trigram.
    pub fn like_patterns(&self) -> impl Iterator<Item = String> + '_ {
        self.terms
            .iter()
            .filter(|term| !is_trigram_term(term))
            .map(|term| format!("%{}%", escape_like(term)))
    }
}

fn is_trigram_term(term: &str) -> bool {
    term.chars().count() >= 3
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Runs search phrases against the index on behalf of request handlers.
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn IndexStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn IndexStore>) -> Self {
        Self { store }
    }

    /// Returns the ids of documents containing every term of `phrase`.
    ///
    /// An empty or whitespace-only phrase matches nothing and never reaches
    /// the store.
    pub async fn query(&self, phrase: &str) -> OraResult<Vec<String>> {
        let query = ConjunctiveQuery::parse(phrase);
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let hits = self.store.search(&query).await?;
        debug!(terms = query.len(), hits = hits.len(), "search executed");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrases_split_on_any_whitespace() {
        let query = ConjunctiveQuery::parse("  alpha\tbeta \n gamma ");
        assert_eq!(query.terms(), ["alpha", "beta", "gamma"]);
        assert!(ConjunctiveQuery::parse(" \t ").is_empty());
    }

    #[test]
    fn long_terms_become_quoted_phrases() {
        let query = ConjunctiveQuery::parse(r#"alpha say"hi" be"#);
        assert_eq!(
            query.match_expression().as_deref(),
            Some(r#""alpha" AND "say""hi"""#)
        );
        assert!(ConjunctiveQuery::parse("a be").match_expression().is_none());
    }

    #[test]
    fn short_terms_become_escaped_like_patterns() {
        let query = ConjunctiveQuery::parse(r"alpha % _a \");
        let patterns: Vec<_> = query.like_patterns().collect();
        assert_eq!(patterns, [r"%\%%", r"%\_a%", r"%\\%"]);
    }
}
