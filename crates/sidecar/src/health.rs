//! The periodic health check.
//!
//! One cycle fans out an independent check to every managed instance.
//! Failures are isolated per instance: a failing check marks that
//! instance unhealthy and nothing else. The cycle itself succeeds as
//! long as every instance was attempted; only a failure to enumerate
//! the instance list is fatal.

use crate::config::HealthCheckConfig;
use crate::error::SidecarError;
use crate::instance::InstanceList;
use crate::tasks::PeriodicTask;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct HealthCheckTask {
    config: HealthCheckConfig,
    instances: Arc<dyn InstanceList>,
}

impl HealthCheckTask {
    pub fn new(config: HealthCheckConfig, instances: Arc<dyn InstanceList>) -> Self {
        Self { config, instances }
    }
}

#[async_trait]
impl PeriodicTask for HealthCheckTask {
    fn name(&self) -> &str {
        "Health Check"
    }

    fn initial_delay(&self) -> Duration {
        self.config.initial_delay()
    }

    fn delay(&self) -> Duration {
        self.config.check_interval()
    }

    async fn execute(&self) -> Result<(), SidecarError> {
        // Enumeration failure is the one fatal error of a cycle.
        let instances = self.instances.instances()?;

        let mut unresolved = Vec::new();
        let mut checks = Vec::with_capacity(instances.len());
        for instance in instances {
            // Resolving the delegate can itself fail; record it and keep
            // going so the remaining instances are still checked.
            match instance.delegate() {
                Ok(delegate) => {
                    let id = instance.id();
                    checks.push(tokio::spawn(async move {
                        (id, delegate.health_check().await)
                    }));
                }
                Err(error) => {
                    warn!(instance = instance.id(), %error, "skipping health check");
                    unresolved.push(instance.id());
                }
            }
        }

        for check in checks {
            match check.await {
                Ok((id, Ok(()))) => debug!(instance = id, "health check passed"),
                Ok((id, Err(error))) => {
                    // An unhealthy instance is a result, not a cycle
                    // failure.
                    warn!(instance = id, %error, "health check failed");
                }
                Err(join_error) => warn!(%join_error, "health check panicked"),
            }
        }

        if unresolved.is_empty() {
            Ok(())
        } else {
            Err(SidecarError::HealthCheck(format!(
                "could not resolve instances {:?}",
                unresolved
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{InstanceMetadata, StoreDelegate};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingDelegate {
        checks: Arc<AtomicUsize>,
        healthy: bool,
    }

    #[async_trait]
    impl StoreDelegate for RecordingDelegate {
        async fn health_check(&self) -> Result<(), SidecarError> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            if self.healthy {
                Ok(())
            } else {
                Err(SidecarError::HealthCheck("connection refused".into()))
            }
        }
    }

    struct StaticInstances {
        instances: Vec<InstanceMetadata>,
    }

    impl InstanceList for StaticInstances {
        fn instances(&self) -> Result<Vec<InstanceMetadata>, SidecarError> {
            Ok(self.instances.clone())
        }
    }

    struct FailingInstances;

    impl InstanceList for FailingInstances {
        fn instances(&self) -> Result<Vec<InstanceMetadata>, SidecarError> {
            Err(SidecarError::InstanceList("config store offline".into()))
        }
    }

    fn instance(id: u32, checks: &Arc<AtomicUsize>, healthy: bool) -> InstanceMetadata {
        InstanceMetadata::new(
            id,
            "127.0.0.1",
            9042,
            Some(Arc::new(RecordingDelegate {
                checks: checks.clone(),
                healthy,
            })),
        )
    }

    fn task(instances: Vec<InstanceMetadata>) -> HealthCheckTask {
        let config = HealthCheckConfig {
            initial_delay_millis: 10,
            check_interval_millis: 1000,
        };
        HealthCheckTask::new(config, Arc::new(StaticInstances { instances }))
    }

    #[test]
    fn test_configuration() {
        let check = task(vec![]);
        assert_eq!(check.initial_delay(), Duration::from_millis(10));
        assert_eq!(check.delay(), Duration::from_millis(1000));
        assert_eq!(check.name(), "Health Check");
    }

    #[tokio::test]
    async fn test_cycle_succeeds_with_no_instances() {
        assert!(task(vec![]).execute().await.is_ok());
    }

    #[tokio::test]
    async fn test_every_instance_is_checked() {
        let checks = Arc::new(AtomicUsize::new(0));
        let instances = (0..5).map(|i| instance(i, &checks, true)).collect();

        assert!(task(instances).execute().await.is_ok());
        assert_eq!(checks.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_unresolvable_instance_does_not_prevent_other_checks() {
        let checks = Arc::new(AtomicUsize::new(0));
        let mut instances: Vec<InstanceMetadata> =
            (0..5).map(|i| instance(i, &checks, true)).collect();
        // No delegate: resolution fails for this one.
        instances.insert(3, InstanceMetadata::new(99, "127.0.0.1", 9042, None));

        let result = task(instances).execute().await;
        assert!(matches!(result, Err(SidecarError::HealthCheck(_))));
        assert_eq!(checks.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_failing_check_does_not_prevent_other_checks() {
        let checks = Arc::new(AtomicUsize::new(0));
        let mut instances: Vec<InstanceMetadata> =
            (0..5).map(|i| instance(i, &checks, true)).collect();
        instances.insert(3, instance(99, &checks, false));

        assert!(task(instances).execute().await.is_ok());
        assert_eq!(checks.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_instance_list_failure_is_fatal() {
        let config = HealthCheckConfig::default();
        let check = HealthCheckTask::new(config, Arc::new(FailingInstances));
        assert!(matches!(
            check.execute().await,
            Err(SidecarError::InstanceList(_))
        ));
    }
}
