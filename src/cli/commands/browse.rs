use super::CommandHandler;
use crate::catalog::{Predicate, Record, RecordKind};
use crate::cli::context::AppContext;
use crate::cli::output;
use crate::Result;
use std::io::Write;

/// What a browse command asks the catalog for
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseQuery {
    List,
    Filter(Vec<String>),
    Search(String),
    Show(String),
    /// Distinct values of one field
    Facets(String),
}

/// Handler for `list`, `filter`, `search`, `show` and `facets`
pub struct BrowseCommand<'a> {
    pub context: &'a AppContext,
    pub kind: RecordKind,
    pub query: BrowseQuery,
    pub json: bool,
}

impl<'a> BrowseCommand<'a> {
    pub fn new(context: &'a AppContext, kind: RecordKind, query: BrowseQuery, json: bool) -> Self {
        Self {
            context,
            kind,
            query,
            json,
        }
    }
}

impl CommandHandler for BrowseCommand<'_> {
    fn execute(&self, out: &mut dyn Write) -> Result<()> {
        let set = self.context.open_catalog(&mut std::io::stderr())?;

        if let BrowseQuery::Show(id) = &self.query {
            let record = set.get_by_id(self.kind, id)?;
            return if self.json {
                output::write_json(out, record)
            } else {
                output::render_detail(out, record)
            };
        }

        if let BrowseQuery::Facets(field) = &self.query {
            let values = set.distinct_values(self.kind, field)?;
            return if self.json {
                output::write_json(out, &values)
            } else {
                output::render_facets(out, self.kind, field, &values)
            };
        }

        let records: Vec<&Record> = match &self.query {
            BrowseQuery::List => set.list(self.kind).collect(),
            BrowseQuery::Filter(conditions) => {
                let predicates = parse_conditions(self.kind, conditions)?;
                set.filter(self.kind, &predicates)?
            }
            BrowseQuery::Search(text) => set.search(self.kind, text),
            BrowseQuery::Show(_) | BrowseQuery::Facets(_) => Vec::new(),
        };

        if self.json {
            output::write_json(out, &records)
        } else {
            output::render_records(out, self.kind, &records)
        }
    }

    fn name(&self) -> &'static str {
        match self.query {
            BrowseQuery::List => "list",
            BrowseQuery::Filter(_) => "filter",
            BrowseQuery::Search(_) => "search",
            BrowseQuery::Show(_) => "show",
            BrowseQuery::Facets(_) => "facets",
        }
    }
}

/// Parse `field=value` conditions against a kind's schema
pub fn parse_conditions(kind: RecordKind, conditions: &[String]) -> Result<Vec<Predicate>> {
    conditions
        .iter()
        .map(|c| Predicate::parse(kind.schema(), c))
        .collect()
}
