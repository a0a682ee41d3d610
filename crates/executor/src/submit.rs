//! Commit entry point contract
//!
//! Submitting a signed transaction goes through the external execution path,
//! which this crate does not implement. The executor only needs something
//! that takes signed bytes and answers once the transaction is final.

use async_trait::async_trait;
use chainql_core::{ChainqlResult, TransactionBlock, TransactionData};

/// External path that commits signed transactions
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Submit `data` with `signatures`, resolving once it is final
    ///
    /// A transaction that executes and aborts is final: it comes back as a
    /// block with a failure status. Errors mean the submission itself could
    /// not complete and should be reported as
    /// [`ChainqlError::Execution`](chainql_core::ChainqlError::Execution).
    async fn submit(&self, data: TransactionData, signatures: Vec<Vec<u8>>) -> ChainqlResult<TransactionBlock>;
}
