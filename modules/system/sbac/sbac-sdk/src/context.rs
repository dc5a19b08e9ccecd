//! Per-request authorization context.
//!
//! An [`AcquireContext`] records what a call attempts (module, operation)
//! and against which resources. It is built once per request through
//! [`AcquireContextBuilder`], evaluated, then handed to the business server.
//!
//! The [`Attachment`] is the only part that changes after construction: it
//! caches every ownership lookup performed during evaluation, so both the
//! evaluator and the business server fetch each [`ResourceEntry`] from the
//! store at most once per request.

use std::collections::{BTreeMap, HashMap};

use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

use crate::error::SbacError;
use crate::models::{BzModule, OwnershipRecord, ResourceEntry, ResourceOperation, ResourceType};
use crate::plugin_api::SbacStorePluginClient;
use crate::request::with_cancellation;

/// Ownership lookups cached for the lifetime of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachment {
    ownership: HashMap<ResourceEntry, OwnershipRecord>,
}

impl Attachment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, entry: &ResourceEntry) -> Option<&OwnershipRecord> {
        self.ownership.get(entry)
    }

    pub fn insert(&mut self, record: OwnershipRecord) {
        self.ownership.insert(record.resource.clone(), record);
    }

    /// Merge `other` into `self`; entries of `other` win on key collision.
    pub fn merge(&mut self, other: Attachment) {
        self.ownership.extend(other.ownership);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ownership.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ownership.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OwnershipRecord> {
        self.ownership.values()
    }
}

/// Authorization context for a single protected call.
#[derive(Debug, Clone)]
pub struct AcquireContext {
    token: SecretString,
    module: BzModule,
    operation: ResourceOperation,
    resources: BTreeMap<ResourceType, Vec<ResourceEntry>>,
    attachment: Attachment,
    cancellation: CancellationToken,
}

impl AcquireContext {
    #[must_use]
    pub fn builder() -> AcquireContextBuilder {
        AcquireContextBuilder::default()
    }

    #[must_use]
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    #[must_use]
    pub fn module(&self) -> BzModule {
        self.module
    }

    #[must_use]
    pub fn operation(&self) -> ResourceOperation {
        self.operation
    }

    #[must_use]
    pub fn resources(&self) -> &BTreeMap<ResourceType, Vec<ResourceEntry>> {
        &self.resources
    }

    /// All requested entries, grouped by type, in insertion order within a type.
    pub fn entries(&self) -> impl Iterator<Item = &ResourceEntry> {
        self.resources.values().flatten()
    }

    /// `true` when the call names no resource at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.values().all(Vec::is_empty)
    }

    #[must_use]
    pub fn attachment(&self) -> &Attachment {
        &self.attachment
    }

    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Ownership of `entry`, read from the attachment or fetched from `store`.
    ///
    /// A fetched record is cached in the attachment, including "unknown
    /// resource" answers, so repeated calls never reach the store twice.
    ///
    /// # Errors
    ///
    /// - [`SbacError::Lookup`] if the store fails
    /// - [`SbacError::Cancelled`] if the request is cancelled mid-lookup
    pub async fn resolve_owner(
        &mut self,
        store: &dyn SbacStorePluginClient,
        entry: &ResourceEntry,
    ) -> Result<OwnershipRecord, SbacError> {
        if let Some(record) = self.attachment.get(entry) {
            tracing::trace!(resource = %entry, "ownership served from attachment");
            return Ok(record.clone());
        }

        let owner = with_cancellation(&self.cancellation, store.owner_of(entry)).await?;
        let record = OwnershipRecord {
            resource: entry.clone(),
            owner,
        };
        self.attachment.insert(record.clone());
        Ok(record)
    }
}

/// Option-style builder for [`AcquireContext`].
///
/// Scalar options overwrite; container options (`resources`, `attachment`)
/// merge into what is already set.
#[derive(Debug, Default)]
pub struct AcquireContextBuilder {
    token: Option<SecretString>,
    module: BzModule,
    operation: ResourceOperation,
    resources: BTreeMap<ResourceType, Vec<ResourceEntry>>,
    attachment: Attachment,
    cancellation: CancellationToken,
}

impl AcquireContextBuilder {
    #[must_use]
    pub fn token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    #[must_use]
    pub fn module(mut self, module: BzModule) -> Self {
        self.module = module;
        self
    }

    #[must_use]
    pub fn operation(mut self, operation: ResourceOperation) -> Self {
        self.operation = operation;
        self
    }

    #[must_use]
    pub fn cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Append `entries` grouped by type, keeping order and dropping exact duplicates.
    #[must_use]
    pub fn resources(mut self, entries: impl IntoIterator<Item = ResourceEntry>) -> Self {
        for entry in entries {
            let bucket = self.resources.entry(entry.resource_type).or_default();
            if !bucket.contains(&entry) {
                bucket.push(entry);
            }
        }
        self
    }

    #[must_use]
    pub fn resource(self, entry: ResourceEntry) -> Self {
        self.resources(std::iter::once(entry))
    }

    #[must_use]
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachment.merge(attachment);
        self
    }

    /// Finish the context.
    ///
    /// # Errors
    ///
    /// Returns [`SbacError::Unauthenticated`] if no token was supplied.
    pub fn build(self) -> Result<AcquireContext, SbacError> {
        let token = self
            .token
            .ok_or_else(|| SbacError::Unauthenticated("missing token".to_owned()))?;
        Ok(AcquireContext {
            token,
            module: self.module,
            operation: self.operation,
            resources: self.resources,
            attachment: self.attachment,
            cancellation: self.cancellation,
        })
    }
}
