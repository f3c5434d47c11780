use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::error;

#[derive(Error, Debug)]
#[error("{0}")]
pub struct Error(String);

impl Error {
    pub fn new(s: &str) -> Error {
        Error(s.to_string())
    }

    pub fn from<E: std::error::Error>(e: E) -> Self {
        Self(e.to_string())
    }
}

#[async_trait]
pub trait Service {
    type Context: Clone + Send;
    async fn new(context: Self::Context) -> Self;
    async fn run(self) -> Result<(), Error>;
}

pub struct ServiceManager<C> {
    context: C,
    services: JoinSet<()>,
}

impl<C> ServiceManager<C>
where
    C: 'static + Clone + Send,
{
    pub fn new(context: C) -> Self {
        Self {
            context,
            services: JoinSet::new(),
        }
    }

    /// Runs a service until it returns cleanly, restarting it after failures
    pub fn spawn<T: Service<Context = C> + Send + 'static>(&mut self) {
        let context = self.context.clone();
        self.services.spawn(async move {
            loop {
                let service = T::new(context.clone()).await;
                match service.run().await {
                    Ok(()) => break,
                    Err(e) => {
                        error!(error = %e, "Service failed, restarting");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });
    }

    pub async fn wait(&mut self) -> Result<(), Error> {
        while let Some(result) = self.services.join_next().await {
            result.map_err(Error::from)?;
        }
        Ok(())
    }
}
