//! Per-watcher license state
//!
//! A tracker follows one selected organization at a time. Every `select`
//! starts a new generation; a fetch that completes under an older generation
//! is discarded, so a slow response for a previous organization can never
//! overwrite the state of the current one.

use std::sync::atomic::{AtomicU64, Ordering};

use aesyros_core::{AppError, LicenseRepository, LicenseSnapshot};
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::license_service::LicenseService;

pub struct LicenseTracker<R> {
    service: LicenseService<R>,
    generation: AtomicU64,
    target: RwLock<Option<Uuid>>,
    current: RwLock<Option<LicenseSnapshot>>,
}

impl<R: LicenseRepository> LicenseTracker<R> {
    pub fn new(service: LicenseService<R>) -> Self {
        Self {
            service,
            generation: AtomicU64::new(0),
            target: RwLock::new(None),
            current: RwLock::new(None),
        }
    }

    /// Switch to another organization (or none). Returns the new generation.
    pub async fn select(&self, organization_id: Option<Uuid>) -> u64 {
        let mut target = self.target.write().await;
        *target = organization_id;
        *self.current.write().await = None;
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn target(&self) -> Option<Uuid> {
        *self.target.read().await
    }

    /// Latest accepted snapshot for the current target.
    pub async fn current(&self) -> Option<LicenseSnapshot> {
        self.current.read().await.clone()
    }

    /// Fetch and evaluate the current target. `Ok(None)` means the target
    /// changed while the fetch was in flight and the result was dropped.
    pub async fn refresh(&self) -> Result<Option<LicenseSnapshot>, AppError> {
        self.load(false).await
    }

    /// Like [`refresh`](Self::refresh) but bypasses the service cache.
    pub async fn refetch(&self) -> Result<Option<LicenseSnapshot>, AppError> {
        self.load(true).await
    }

    async fn load(&self, bypass_cache: bool) -> Result<Option<LicenseSnapshot>, AppError> {
        let (generation, target) = {
            let target = self.target.read().await;
            (self.generation.load(Ordering::SeqCst), *target)
        };

        let snapshot = match target {
            Some(organization_id) if bypass_cache => self.service.refetch(organization_id).await,
            Some(organization_id) => self.service.snapshot(organization_id).await,
            None => Ok(LicenseSnapshot::compute(None, Utc::now())),
        };

        // Hold the target lock so a concurrent select cannot interleave
        let _target = self.target.read().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(
                started = generation,
                current = self.generation(),
                "Discarding stale license response"
            );
            return Ok(None);
        }

        let snapshot = snapshot?;
        *self.current.write().await = Some(snapshot.clone());
        Ok(Some(snapshot))
    }
}
