//! Monitored domain set.
//!
//! The set is owned by whatever edits it; the status pipeline only reads it,
//! and reads it fresh on every navigation.

use super::connection::CacheDb;
use crate::Error;
use tokio_rusqlite::params;
use url::Url;

/// Read access to the current set of monitored domains.
#[async_trait::async_trait]
pub trait DomainSource: Send + Sync {
    async fn domains(&self) -> Result<Vec<String>, Error>;
}

#[async_trait::async_trait]
impl DomainSource for Vec<String> {
    async fn domains(&self) -> Result<Vec<String>, Error> {
        Ok(self.clone())
    }
}

#[async_trait::async_trait]
impl DomainSource for CacheDb {
    async fn domains(&self) -> Result<Vec<String>, Error> {
        self.list_domains().await
    }
}

impl CacheDb {
    /// List monitored domains in the order they were added.
    pub async fn list_domains(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT domain FROM target_domains ORDER BY position ASC")?;
                let domains = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(domains)
            })
            .await
            .map_err(Error::from)
    }

    /// Replace the whole domain set.
    ///
    /// Entries are trimmed; blanks and duplicates are dropped, first
    /// occurrence wins. Any entry that is not a bare hostname fails the
    /// whole call and the stored set is left unchanged.
    pub async fn replace_domains(&self, domains: &[String]) -> Result<(), Error> {
        let mut cleaned: Vec<String> = Vec::with_capacity(domains.len());
        for domain in domains {
            let domain = domain.trim();
            if domain.is_empty() || cleaned.iter().any(|d| d == domain) {
                continue;
            }
            validate_domain(domain)?;
            cleaned.push(domain.to_string());
        }

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM target_domains", [])?;
                {
                    let mut stmt = tx.prepare("INSERT INTO target_domains (position, domain) VALUES (?1, ?2)")?;
                    for (position, domain) in cleaned.iter().enumerate() {
                        stmt.execute(params![position as i64, domain])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

/// Accept `domain` only if `https://<domain>` parses to that host alone.
fn validate_domain(domain: &str) -> Result<(), Error> {
    let url = Url::parse(&format!("https://{domain}"))
        .map_err(|e| Error::InvalidInput(format!("invalid domain {domain:?}: {e}")))?;

    let bare = url.host_str().is_some()
        && url.username().is_empty()
        && url.password().is_none()
        && url.port().is_none()
        && url.path() == "/"
        && url.query().is_none()
        && url.fragment().is_none();

    if !bare {
        return Err(Error::InvalidInput(format!("invalid domain {domain:?}: expected a bare hostname")));
    }
    Ok(())
}
