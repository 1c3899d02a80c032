//! The per-request tenant slot.
//!
//! A `tokio::task_local!` cell holds the active tenant for the current
//! logical request. Concurrent requests run as separate tasks and therefore
//! hold separate slots; one task can never observe another's binding.
//!
//! The slot only exists inside a [`tenant_scope`] — the authentication gate
//! enters one per request. When the scoped future completes or is dropped,
//! the slot is destroyed with it, so a stale binding cannot survive into the
//! next request scheduled on the same worker.

use std::cell::RefCell;
use tombola_core::TenantId;

type TenantSlot = RefCell<Option<TenantId>>;

tokio::task_local! {
    static TENANT_SLOT: TenantSlot;
}

/// Future returned by [`tenant_scope`].
pub type TenantScopeFuture<F> = tokio::task::futures::TaskLocalFuture<TenantSlot, F>;

/// Runs `fut` with a fresh, empty tenant slot.
///
/// The slot lives exactly as long as the returned future: dropping the
/// future mid-flight (cancellation) destroys the slot along with it.
pub fn tenant_scope<F>(fut: F) -> TenantScopeFuture<F>
where
    F: std::future::Future,
{
    TENANT_SLOT.scope(RefCell::new(None), fut)
}

/// Runs `fut` with the tenant slot pre-bound to `tenant`.
pub(crate) fn tenant_scope_with<F>(tenant: Option<TenantId>, fut: F) -> TenantScopeFuture<F>
where
    F: std::future::Future,
{
    TENANT_SLOT.scope(RefCell::new(tenant), fut)
}

/// Binds `tenant` as the active tenant for the current request.
///
/// Overwrites any prior binding (last write wins within one request).
/// Outside a scope this is a no-op: there is no slot to write to, which
/// only happens for code running outside a request (startup, background
/// tasks) where the anonymous context is the correct answer anyway.
pub fn bind_tenant(tenant: TenantId) {
    let outcome = TENANT_SLOT.try_with(|slot| {
        *slot.borrow_mut() = Some(tenant.clone());
    });
    if outcome.is_err() {
        tracing::debug!(tenant_id = %tenant, "bind_tenant called outside a request scope");
    }
}

/// Returns the tenant bound to the current request, if any.
///
/// `None` means the anonymous/global context: either no tenant was bound,
/// or the caller is running outside a request scope entirely.
#[must_use]
pub fn current_tenant() -> Option<TenantId> {
    TENANT_SLOT
        .try_with(|slot| slot.borrow().clone())
        .ok()
        .flatten()
}

/// Unconditionally removes the current request's tenant binding.
///
/// Idempotent; a no-op outside a scope.
pub fn clear_tenant() {
    let _ = TENANT_SLOT.try_with(|slot| {
        slot.borrow_mut().take();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tid(s: &str) -> TenantId {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_empty_outside_scope() {
        assert_eq!(current_tenant(), None);
        // Writes outside a scope are swallowed, not panics.
        bind_tenant(tid("t1"));
        clear_tenant();
        assert_eq!(current_tenant(), None);
    }

    #[tokio::test]
    async fn test_scope_starts_empty_and_binds() {
        tenant_scope(async {
            assert_eq!(current_tenant(), None);
            bind_tenant(tid("t1"));
            assert_eq!(current_tenant(), Some(tid("t1")));
        })
        .await;
        assert_eq!(current_tenant(), None);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        tenant_scope(async {
            bind_tenant(tid("t1"));
            bind_tenant(tid("t2"));
            assert_eq!(current_tenant(), Some(tid("t2")));
        })
        .await;
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        tenant_scope(async {
            bind_tenant(tid("t1"));
            clear_tenant();
            assert_eq!(current_tenant(), None);
            clear_tenant();
            assert_eq!(current_tenant(), None);
        })
        .await;
    }

    #[tokio::test]
    async fn test_binding_survives_await_points() {
        tenant_scope(async {
            bind_tenant(tid("t1"));
            tokio::task::yield_now().await;
            assert_eq!(current_tenant(), Some(tid("t1")));
        })
        .await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_tasks_are_isolated() {
        let mut handles = Vec::new();
        for i in 0..16 {
            handles.push(tokio::spawn(tenant_scope(async move {
                let mine = tid(&format!("t{i}"));
                bind_tenant(mine.clone());
                // Yield so tasks interleave on the shared workers.
                for _ in 0..8 {
                    tokio::task::yield_now().await;
                    assert_eq!(current_tenant(), Some(mine.clone()));
                }
            })));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_cancelled_scope_leaves_no_binding() {
        let scoped = tenant_scope(async {
            bind_tenant(tid("t1"));
            std::future::pending::<()>().await;
        });
        // Poll once so the binding happens, then drop mid-flight.
        tokio::select! {
            () = scoped => unreachable!(),
            () = tokio::task::yield_now() => {}
        }
        assert_eq!(current_tenant(), None);
        // A fresh scope on the same task starts empty.
        tenant_scope(async {
            assert_eq!(current_tenant(), None);
        })
        .await;
    }

    #[tokio::test]
    async fn test_spawned_tasks_do_not_inherit_binding() {
        tenant_scope(async {
            bind_tenant(tid("t1"));
            let observed = tokio::spawn(async { current_tenant() }).await.unwrap();
            assert_eq!(observed, None);
        })
        .await;
    }
}
