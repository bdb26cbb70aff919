//! [`SweepLoginThrottle`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Start};
use tokio::time::interval;
use tracing as log;

#[cfg(doc)]
use crate::throttle;
use crate::Service;

use super::Task;

/// Configuration for [`SweepLoginThrottle`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between sweeps of the [`throttle::Registry`].
    pub interval: time::Duration,
}

/// [`Task`] for evicting stale entries from the [`throttle::Registry`].
///
/// The registry drops a stale entry on its next touch anyway, so this
/// [`Task`] only keeps the registry from accumulating keys that are never
/// touched again.
#[derive(Clone, Copy, Debug)]
pub struct SweepLoginThrottle<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<SweepLoginThrottle<Self>, Config>>> for Service<Db>
where
    SweepLoginThrottle<Service<Db>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<SweepLoginThrottle<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = SweepLoginThrottle {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::SweepLoginThrottle` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for SweepLoginThrottle<Service<Db>> {
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        self.service
            .throttle()
            .sweep(self.service.config().login_throttle);
        Ok(())
    }
}

/// Error of [`SweepLoginThrottle`] execution.
pub type ExecutionError = Infallible;
