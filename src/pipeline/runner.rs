use tracing::debug;

use crate::{
    RunLog, UnifierConfig, UnifyResult,
    composer::{QueryComposer, UnifiedQuery},
    glossary::Glossary,
    parser::ParsedQuery,
    ticket::{Publication, QueryExtractor, TicketGateway},
    unifier::{SchemaUnifier, UnifiedSchema},
};

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnificationOutcome {
    pub table_name: String,
    pub schema: UnifiedSchema,
    pub query: UnifiedQuery,
}

/// Ticket text in, unified SQL out.
///
/// [`Unifier::unify_ticket`] is the synchronous core; [`Unifier::run`] wraps it
/// with one ticket read and one publication through a [`TicketGateway`].
#[derive(Debug, Clone)]
pub struct Unifier {
    config: UnifierConfig,
    extractor: QueryExtractor,
}

impl Unifier {
    pub fn new(config: UnifierConfig) -> UnifyResult<Self> {
        let extractor = QueryExtractor::from_config(&config)?;
        Ok(Self { config, extractor })
    }

    pub fn config(&self) -> &UnifierConfig {
        &self.config
    }

    pub fn unify_ticket(&self, body: &str, glossary: Option<&Glossary>, log: &mut RunLog) -> UnifyResult<UnificationOutcome> {
        let ticket = self.extractor.extract(body)?;

        log.table_name = Some(ticket.table_name.clone());
        log.query_count = Some(ticket.queries.len());

        let labels = ticket.queries.iter().map(|q| q.source_label.as_str()).collect::<Vec<_>>();
        log.info(format!("Extracted {} query(ies): {}", ticket.queries.len(), labels.join(", ")));
        if ticket.table_name_defaulted {
            log.warn(format!("No final table name given; using `{}`", ticket.table_name));
        } else {
            log.info(format!("Final table: `{}`", ticket.table_name));
        }

        let mut queries = Vec::with_capacity(ticket.queries.len());
        for raw in &ticket.queries {
            let query = ParsedQuery::resolve(raw)?;
            Self::log_query_notes(&query, log);
            queries.push(query);
        }

        let unification = SchemaUnifier::unify(&queries, log)?;

        let query = QueryComposer::from_config(&self.config, &ticket.table_name).compose(
            &queries,
            &unification,
            glossary,
            log,
        )?;

        Ok(UnificationOutcome { table_name: ticket.table_name, schema: unification.schema, query })
    }

    fn log_query_notes(query: &ParsedQuery, log: &mut RunLog) {
        debug!("{} resolved from: {}", query.source_label, query.raw_text);

        if !query.repairs.is_empty() {
            let repairs = query.repairs.iter().map(ToString::to_string).collect::<Vec<_>>();
            log.info(format!("{}: {}", query.source_label, repairs.join(", ")));
        }
        for column in query.unaliased_expressions() {
            log.warn(format!(
                "{}: expression `{}` has no alias; its text is used as the column name",
                query.source_label, column.expression
            ));
        }
        if query.has_set_operation {
            log.warn(format!(
                "{}: top-level set operation kept inside its CTE; only the first SELECT defines the columns",
                query.source_label
            ));
        }
        if query.unbalanced {
            log.warn(format!("{}: parentheses are unbalanced; query passed through as is", query.source_label));
        }
    }

    /// Loads the configured glossary. Any failure only disables renaming.
    pub async fn load_glossary(&self, log: &mut RunLog) -> Option<Glossary> {
        let Some(path) = &self.config.glossary_path else {
            log.info("No glossary configured; column names kept");
            return None;
        };

        match Glossary::load(path, self.config.glossary_delimiter).await {
            Ok(Some(glossary)) => {
                log.info(format!("Loaded glossary {} ({} entries)", path.display(), glossary.len()));
                Some(glossary)
            },
            Ok(None) => {
                log.warn(format!("Glossary {} not found; column names kept", path.display()));
                None
            },
            Err(err) => {
                log.warn(format!("{err}; column names kept"));
                None
            },
        }
    }

    /// Reads the ticket, unifies it and publishes the SQL with the run log.
    /// On failure the log alone is published and the error is returned.
    pub async fn run<G: TicketGateway>(&self, gateway: &G) -> UnifyResult<UnificationOutcome> {
        let mut log = RunLog::new();
        log.ticket = gateway.ticket_ref();

        let result = match gateway.fetch_ticket_body().await {
            Ok(body) => {
                let glossary = self.load_glossary(&mut log).await;
                self.unify_ticket(&body, glossary.as_ref(), &mut log)
            },
            Err(err) => Err(err),
        };

        let table_name = log.table_name.clone().unwrap_or_else(|| self.config.default_table_name.clone());

        match result {
            Ok(outcome) => {
                let publication = Publication { table_name, sql: Some(outcome.query.sql.clone()), log };
                gateway.publish_result(&publication).await?;
                Ok(outcome)
            },
            Err(err) => {
                log.fail(&err);
                let publication = Publication { table_name, sql: None, log };
                gateway.publish_result(&publication).await?;
                Err(err)
            },
        }
    }
}
