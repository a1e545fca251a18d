use serde::Deserialize;

/// Query-string parameters accepted by list endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

/// Free-text search: every term must appear (case-insensitively) in at least
/// one of the searched fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    terms: Vec<String>,
}

impl SearchFilter {
    /// Split the raw query on whitespace and commas. Double-quoted phrases
    /// are kept together as one term.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        let mut terms = Vec::new();
        let mut current = String::new();
        let mut quoted = false;

        for c in raw.replace('\0', "").chars() {
            match c {
                '"' => {
                    quoted = !quoted;
                    if !quoted {
                        push_term(&mut terms, &mut current);
                    }
                }
                c if !quoted && (c.is_whitespace() || c == ',') => push_term(&mut terms, &mut current),
                c => current.push(c),
            }
        }
        push_term(&mut terms, &mut current);

        Self { terms }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// In-process match against the searched field values
    pub fn matches(&self, fields: &[&str]) -> bool {
        let haystacks: Vec<String> = fields.iter().map(|f| f.to_lowercase()).collect();
        self.terms.iter().all(|term| {
            let needle = term.to_lowercase();
            haystacks.iter().any(|h| h.contains(&needle))
        })
    }

    /// Build a SQL condition over `columns` with positional parameters
    /// starting at `$starting_param_index`. Returns None when there is
    /// nothing to filter on.
    pub fn where_clause(&self, columns: &[&str], starting_param_index: usize) -> Option<(String, Vec<String>)> {
        if self.is_empty() || columns.is_empty() {
            return None;
        }

        let mut params = Vec::with_capacity(self.terms.len());
        let mut index = starting_param_index;
        let conditions: Vec<String> = self
            .terms
            .iter()
            .map(|term| {
                params.push(format!("%{}%", escape_like(term)));
                let placeholder = format!("${}", index);
                index += 1;
                let alternatives: Vec<String> = columns
                    .iter()
                    .map(|column| format!("{} ILIKE {}", quote_column(column), placeholder))
                    .collect();
                format!("({})", alternatives.join(" OR "))
            })
            .collect();

        Some((conditions.join(" AND "), params))
    }
}

fn push_term(terms: &mut Vec<String>, current: &mut String) {
    let term = current.trim();
    if !term.is_empty() {
        terms.push(term.to_string());
    }
    current.clear();
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Quote a possibly table-qualified column: u.name -> "u"."name"
fn quote_column(column: &str) -> String {
    column
        .split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_and_commas() {
        let filter = SearchFilter::parse(Some("  ada, lovelace  example.com "));
        assert_eq!(filter.terms(), ["ada", "lovelace", "example.com"]);
    }

    #[test]
    fn keeps_quoted_phrases() {
        let filter = SearchFilter::parse(Some("\"ada lovelace\" math"));
        assert_eq!(filter.terms(), ["ada lovelace", "math"]);
    }

    #[test]
    fn missing_or_blank_query_matches_everything() {
        assert!(SearchFilter::parse(None).is_empty());
        assert!(SearchFilter::parse(Some(" , ")).is_empty());
        assert!(SearchFilter::parse(None).matches(&["anything"]));
    }

    #[test]
    fn every_term_must_match_some_field() {
        let filter = SearchFilter::parse(Some("ADA example"));
        assert!(filter.matches(&["Ada Lovelace", "ada@example.com"]));
        assert!(!filter.matches(&["Ada Lovelace", "ada@mail.org"]));
    }

    #[test]
    fn builds_parameterised_sql() {
        let filter = SearchFilter::parse(Some("ada 100%"));
        let (sql, params) = filter.where_clause(&["u.name", "email"], 1).unwrap();
        assert_eq!(
            sql,
            "(\"u\".\"name\" ILIKE $1 OR \"email\" ILIKE $1) AND (\"u\".\"name\" ILIKE $2 OR \"email\" ILIKE $2)"
        );
        assert_eq!(params, vec!["%ada%".to_string(), "%100\\%%".to_string()]);
    }

    #[test]
    fn no_sql_without_terms() {
        assert!(SearchFilter::default().where_clause(&["name"], 1).is_none());
    }
}
