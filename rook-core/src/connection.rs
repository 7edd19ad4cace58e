use crate::{Executor, Result, Statement};
use std::future::Future;

pub trait Connection: Executor {
    /// Open a connection to the given URL.
    fn connect(url: &str) -> impl Future<Output = Result<Self>>;

    fn begin(&mut self) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.execute(Statement::new("BEGIN")).await?;
            Ok(())
        }
    }

    fn commit(&mut self) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.execute(Statement::new("COMMIT")).await?;
            Ok(())
        }
    }

    fn rollback(&mut self) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.execute(Statement::new("ROLLBACK")).await?;
            Ok(())
        }
    }
}
