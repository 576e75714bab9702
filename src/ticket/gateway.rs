use std::{fmt::{self, Display}, future::Future, path::PathBuf};

use crate::{RunLog, UnifyError, UnifyResult};

/// Where the ticket lives, when known.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TicketRef {
    pub number: Option<u64>,
    pub repository: Option<String>,
}

impl TicketRef {
    /// Reads `ISSUE_NUMBER` and `REPO_NAME`. `None` when neither is set.
    pub fn from_env() -> Option<Self> {
        let number = std::env::var("ISSUE_NUMBER").ok().and_then(|value| value.trim().parse::<u64>().ok());
        let repository = std::env::var("REPO_NAME").ok().filter(|value| !value.trim().is_empty());

        if number.is_none() && repository.is_none() {
            return None;
        }

        Some(Self { number, repository })
    }
}

impl Display for TicketRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.repository, self.number) {
            (Some(repository), Some(number)) => write!(f, "{repository}#{number}"),
            (Some(repository), None) => write!(f, "{repository}"),
            (None, Some(number)) => write!(f, "#{number}"),
            (None, None) => write!(f, "unknown"),
        }
    }
}

/// What a run hands back to the ticket. `sql` is `None` when the run failed.
#[derive(Debug, Clone)]
pub struct Publication {
    pub table_name: String,
    pub sql: Option<String>,
    pub log: RunLog,
}

/// Boundary to the ticketing system. Called once to read the ticket and once
/// to publish, with no retry.
pub trait TicketGateway {
    fn ticket_ref(&self) -> Option<TicketRef> {
        None
    }

    fn fetch_ticket_body(&self) -> impl Future<Output = UnifyResult<String>> + Send;

    fn publish_result(&self, publication: &Publication) -> impl Future<Output = UnifyResult<()>> + Send;
}

#[derive(Debug, Clone)]
pub enum TicketSource {
    File(PathBuf),
    /// The `ISSUE_BODY` environment variable.
    Env,
}

/// Reads the ticket from a file or the environment and writes
/// `<table>.sql` and `<table>.log.md` into `output_dir`.
#[derive(Debug, Clone)]
pub struct FileGateway {
    source: TicketSource,
    output_dir: PathBuf,
    ticket: Option<TicketRef>,
}

impl FileGateway {
    pub fn new(source: TicketSource, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            output_dir: output_dir.into(),
            ticket: TicketRef::from_env(),
        }
    }

    pub fn with_ticket_ref(mut self, ticket: TicketRef) -> Self {
        self.ticket = Some(ticket);
        self
    }

    pub fn sql_path(&self, table_name: &str) -> PathBuf {
        self.output_dir.join(format!("{table_name}.sql"))
    }

    pub fn log_path(&self, table_name: &str) -> PathBuf {
        self.output_dir.join(format!("{table_name}.log.md"))
    }
}

impl TicketGateway for FileGateway {
    fn ticket_ref(&self) -> Option<TicketRef> {
        self.ticket.clone()
    }

    async fn fetch_ticket_body(&self) -> UnifyResult<String> {
        match &self.source {
            TicketSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|err| UnifyError::io(format!("reading ticket {}", path.display()), err)),
            TicketSource::Env => std::env::var("ISSUE_BODY")
                .map_err(|_| UnifyError::validation("ISSUE_BODY is not set and no ticket file was given")),
        }
    }

    async fn publish_result(&self, publication: &Publication) -> UnifyResult<()> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|err| UnifyError::io(format!("creating {}", self.output_dir.display()), err))?;

        if let Some(sql) = &publication.sql {
            let path = self.sql_path(&publication.table_name);
            tokio::fs::write(&path, format!("{sql}\n"))
                .await
                .map_err(|err| UnifyError::io(format!("writing {}", path.display()), err))?;
        }

        let path = self.log_path(&publication.table_name);
        tokio::fs::write(&path, publication.log.render_markdown())
            .await
            .map_err(|err| UnifyError::io(format!("writing {}", path.display()), err))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{RunLog, ticket::{FileGateway, Publication, TicketGateway, TicketRef, TicketSource}};

    #[test]
    pub fn test_ticket_ref_display() {
        let full = TicketRef { number: Some(7), repository: Some("acme/dw".to_string()) };
        let number_only = TicketRef { number: Some(7), repository: None };

        assert_eq!(full.to_string(), "acme/dw#7");
        assert_eq!(number_only.to_string(), "#7");
    }

    #[tokio::test]
    async fn test_fetch_from_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let ticket = dir.path().join("ticket.md");
        std::fs::write(&ticket, "Query 1: SELECT a FROM t").expect("Failed to write ticket");

        let gateway = FileGateway::new(TicketSource::File(ticket), dir.path());

        let body = gateway.fetch_ticket_body().await.expect("Failed to read ticket");
        assert_eq!(body, "Query 1: SELECT a FROM t");
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let gateway = FileGateway::new(TicketSource::File(dir.path().join("nope.md")), dir.path());

        let err = gateway.fetch_ticket_body().await.expect_err("Missing ticket should fail");
        assert_eq!(err.kind(), "IoError");
    }

    #[tokio::test]
    async fn test_publish_writes_artifacts() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let output = dir.path().join("out");
        let gateway = FileGateway::new(TicketSource::Env, &output);
        let publication = Publication {
            table_name: "merged".to_string(),
            sql: Some("SELECT 1".to_string()),
            log: RunLog::new(),
        };

        gateway.publish_result(&publication).await.expect("Failed to publish");

        let sql = std::fs::read_to_string(gateway.sql_path("merged")).expect("Missing sql file");
        let log = std::fs::read_to_string(gateway.log_path("merged")).expect("Missing log file");
        assert_eq!(sql, "SELECT 1\n");
        assert!(log.starts_with("## Query unification report"));
    }

    #[tokio::test]
    async fn test_publish_failure_writes_only_log() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let gateway = FileGateway::new(TicketSource::Env, dir.path());
        let publication = Publication { table_name: "merged".to_string(), sql: None, log: RunLog::new() };

        gateway.publish_result(&publication).await.expect("Failed to publish");

        assert!(!gateway.sql_path("merged").exists());
        assert!(gateway.log_path("merged").exists());
    }
}
