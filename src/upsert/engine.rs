//! The shared transactional retry engine.
//!
//! One attempt = one transaction: resolve, then materialize or patch, then
//! the caller hook, then a conditional persist. A uniqueness conflict rolls
//! the attempt back and re-enters from resolve — a concurrent writer may now
//! have created the row — bounded by the call-local retry budget. Every other
//! failure propagates verbatim.

use super::conflict::{ConflictRetryPolicy, FailureClass};
use super::{HookOutcome, SaveMode};
use crate::core::{Record, Result};
use crate::scope::{AttributePatch, Scope};
use crate::storage::engine::{ScopeStore, StoreTransaction};
use std::thread;
use std::time::Duration;

pub(crate) type Hook<'a> = &'a mut dyn FnMut(&mut Record) -> HookOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Family {
    FindOrInitialize,
    CreateOrUpdate,
}

pub(crate) fn run_scoped<S: ScopeStore>(
    store: &S,
    scope: &Scope,
    policy: &ConflictRetryPolicy,
    family: Family,
    mode: SaveMode,
    attrs: &AttributePatch,
    mut hook: Option<Hook<'_>>,
) -> Result<Record> {
    // Call-local budget: concurrent unrelated calls must not interfere.
    let mut retries = 0usize;
    loop {
        let tx = store.begin()?;
        let hook_reborrow: Option<Hook<'_>> = match hook.as_mut() {
            Some(h) => Some(&mut **h),
            None => None,
        };
        let outcome = match family {
            Family::FindOrInitialize => {
                find_or_initialize_attempt(store, &tx, scope, mode, attrs, hook_reborrow)
            }
            Family::CreateOrUpdate => {
                create_or_update_attempt(store, &tx, scope, mode, attrs, hook_reborrow)
            }
        };

        match outcome {
            Ok(record) => {
                tx.commit()?;
                return Ok(record);
            }
            Err(err) => {
                tx.rollback()?;
                let retryable =
                    matches!(store.classify_failure(&err), FailureClass::UniquenessConflict);
                if retryable && retries < policy.max_retries {
                    retries += 1;
                    log::warn!(
                        "uniqueness conflict on '{}', retrying ({}/{}): {}",
                        scope.table(),
                        retries,
                        policy.max_retries,
                        err
                    );
                    let backoff = policy.backoff_ms(retries);
                    if backoff > 0 {
                        thread::sleep(Duration::from_millis(backoff));
                    }
                    continue;
                }
                // Past the ceiling the ORIGINAL conflict surfaces, unwrapped.
                return Err(err);
            }
        }
    }
}

fn find_or_initialize_attempt<S: ScopeStore>(
    store: &S,
    tx: &S::Tx,
    scope: &Scope,
    mode: SaveMode,
    attrs: &AttributePatch,
    hook: Option<Hook<'_>>,
) -> Result<Record> {
    // An existing match is returned untouched: no patch, no hook. Callers
    // that want to mutate a match use the create-or-update family.
    if let Some(existing) = store.resolve(tx, scope)? {
        return Ok(existing);
    }

    let mut record = store.materialize(scope, attrs)?;
    if hook_aborts(hook, &mut record) {
        return Ok(record);
    }
    if mode != SaveMode::NoPersist {
        persist_record(store, tx, &mut record, mode)?;
    }
    Ok(record)
}

fn create_or_update_attempt<S: ScopeStore>(
    store: &S,
    tx: &S::Tx,
    scope: &Scope,
    mode: SaveMode,
    attrs: &AttributePatch,
    hook: Option<Hook<'_>>,
) -> Result<Record> {
    let mut record = match store.resolve(tx, scope)? {
        Some(existing) => existing,
        None => store.materialize(scope, &AttributePatch::new())?,
    };

    // An empty patch means "no changes requested": only the hook, if any,
    // mutates the target.
    if !attrs.is_empty() {
        store.apply_patch(&mut record, attrs)?;
    }
    if hook_aborts(hook, &mut record) {
        return Ok(record);
    }
    if mode != SaveMode::NoPersist {
        persist_record(store, tx, &mut record, mode)?;
    }
    Ok(record)
}

fn hook_aborts(hook: Option<Hook<'_>>, record: &mut Record) -> bool {
    match hook {
        Some(hook) => matches!(hook(record), HookOutcome::AbortSave),
        None => false,
    }
}

fn persist_record<S: ScopeStore>(
    store: &S,
    tx: &S::Tx,
    record: &mut Record,
    mode: SaveMode,
) -> Result<()> {
    match store.persist(tx, record) {
        Ok(()) => Ok(()),
        Err(err) if mode == SaveMode::Persist && err.is_validation() => {
            // Try-save semantics: nothing is written and the record carries
            // its validation messages for the caller to inspect.
            record.add_error(err.to_string());
            Ok(())
        }
        Err(err) => Err(err),
    }
}
