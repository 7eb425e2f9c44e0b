//! Redemption Code Repository
//!
//! The code registry: issuance, read-only validation, atomic redemption,
//! and the expired-code sweep. At-most-once redemption is enforced by a
//! single conditional UPDATE, never by read-then-write.

use rand::Rng;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{CodeState, CupSize, RedemptionCode};
use crate::utils::time::now_millis;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const TABLE: &str = "redemption_code";

const CODE_LEN: usize = 5;
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Codes are valid for 24 hours from issuance
pub const CODE_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Collision odds per draw are ~1/36^5; the cap only guards against a
/// broken generator and is unreachable under expected load.
const MAX_GENERATION_ATTEMPTS: usize = 100;

#[derive(Clone)]
pub struct CodeRepository {
    base: BaseRepository,
}

impl CodeRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn random_code() -> String {
        let mut rng = rand::thread_rng();
        (0..CODE_LEN)
            .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
            .collect()
    }

    /// Find the unused record for a code value, if any.
    ///
    /// Used/expired duplicates of the same value may exist; lookups only
    /// ever consider the unused one.
    async fn find_unused(&self, code: &str) -> RepoResult<Option<RedemptionCode>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM redemption_code WHERE code = $code AND state = 'UNUSED' LIMIT 1")
            .bind(("code", code.to_string()))
            .await?;
        let rows: Vec<RedemptionCode> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Issue a new code for a cup size.
    ///
    /// Regenerates on collision with a currently-unused code; collisions
    /// with used or swept codes are fine and not checked.
    pub async fn issue(&self, cup_size: CupSize, issued_by: &str) -> RepoResult<RedemptionCode> {
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let code = Self::random_code();
            if self.find_unused(&code).await?.is_some() {
                continue;
            }

            let now = now_millis();
            let record = RedemptionCode {
                id: None,
                code,
                cup_size,
                state: CodeState::Unused,
                issued_by: issued_by.to_string(),
                order_ref: None,
                used_at: None,
                issued_at: now,
                expires_at: now + CODE_TTL_MS,
            };
            let created: Option<RedemptionCode> =
                self.base.db().create(TABLE).content(record).await?;
            return created
                .ok_or_else(|| RepoError::Database("Failed to create redemption code".into()));
        }
        Err(RepoError::Database(
            "Failed to generate a unique code after repeated attempts".into(),
        ))
    }

    /// Read-only validation: the code exists unused and is not expired.
    ///
    /// Wrong case is normalized, not rejected. This never reserves the
    /// code — a caller must still handle `redeem` failing afterwards.
    pub async fn validate(&self, code: &str) -> RepoResult<RedemptionCode> {
        let code = code.trim().to_uppercase();
        let found = self
            .find_unused(&code)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Code {code} not found")))?;
        if found.expires_at < now_millis() {
            return Err(RepoError::Expired(format!("Code {code} expired")));
        }
        Ok(found)
    }

    /// Consume a code for an order: Unused→Used, exactly once.
    ///
    /// The flip is a single conditional UPDATE, so concurrent redeems of
    /// the same value are serialized by the storage engine — exactly one
    /// caller gets the record back, the rest see NotFound.
    pub async fn redeem(&self, code: &str, order_ref: &RecordId) -> RepoResult<RedemptionCode> {
        let code = code.trim().to_uppercase();
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE redemption_code \
                 SET state = 'USED', order_ref = $order_ref, used_at = $now \
                 WHERE code = $code AND state = 'UNUSED' AND expires_at >= $now \
                 RETURN AFTER",
            )
            .bind(("code", code.clone()))
            .bind(("order_ref", order_ref.clone()))
            .bind(("now", now))
            .await?;
        let rows: Vec<RedemptionCode> = result.take(0)?;

        match rows.into_iter().next() {
            Some(updated) => Ok(updated),
            // Classify the miss: an expired-but-unused record reports
            // Expired, everything else (never issued, already used) is
            // NotFound.
            None => match self.find_unused(&code).await? {
                Some(_) => Err(RepoError::Expired(format!("Code {code} expired"))),
                None => Err(RepoError::NotFound(format!("Code {code} not found"))),
            },
        }
    }

    /// Sweep expired-and-unused codes. Used records are kept as history,
    /// expired or not. Idempotent; returns the number removed.
    pub async fn cleanup_expired(&self) -> RepoResult<u64> {
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                "DELETE redemption_code \
                 WHERE state = 'UNUSED' AND expires_at < $now \
                 RETURN BEFORE",
            )
            .bind(("now", now))
            .await?;
        let removed: Vec<RedemptionCode> = result.take(0)?;
        Ok(removed.len() as u64)
    }
}
