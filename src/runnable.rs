//! # Runnable
//!
//! A runnable is one step of a chain: it takes a typed input and produces a typed output via
//! [invoke](Runnable::invoke). Prompt templates, chat models and output parsers are all runnables, so a chain is just
//! runnables [piped](RunnableExt::pipe) together:
//!
//! ```text
//! prompt template -> chat model -> output parser
//! ```
//!
//! Every runnable also gets [batch](Runnable::batch), which invokes many inputs concurrently and returns the outputs
//! in input order, and [stream](Runnable::stream), which yields the output piece by piece when the runnable supports
//! it and as a single item otherwise.

pub mod lambda;
pub mod parallel;
pub mod sequence;

use std::sync::Arc;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use crate::utils::JsonMap;

pub use lambda::RunnableLambda;
pub use parallel::RunnableParallel;
pub use sequence::RunnableSequence;

/// Per-call knobs for runnables.
#[derive(Debug, Clone, Default)]
pub struct RunnableConfig {
    /// Upper bound of concurrent invocations in [Runnable::batch_with_config]. `None` means unbounded.
    pub max_concurrency: Option<usize>,
    /// Free-form settings a runnable may read, e.g. `temperature`.
    pub configurable: JsonMap,
}

//TODO: when async fn in dyn traits is stable, remove async_trait macro

/// A typed, composable unit of work.
#[async_trait]
pub trait Runnable: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Process a single input.
    async fn invoke(&self, input: Self::Input) -> Result<Self::Output>;

    /// Invoke all inputs concurrently. Outputs are in input order; the first error aborts the batch.
    async fn batch(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>> {
        self.batch_with_config(inputs, &RunnableConfig::default()).await
    }

    /// Same as [Runnable::batch] but honours [RunnableConfig::max_concurrency].
    async fn batch_with_config(&self, inputs: Vec<Self::Input>, config: &RunnableConfig) -> Result<Vec<Self::Output>> {
        let limit = config.max_concurrency.unwrap_or(inputs.len()).max(1);
        stream::iter(inputs)
            .map(|input| self.invoke(input))
            .buffered(limit)
            .try_collect()
            .await
    }

    /// Stream the output. By default the whole output of [Runnable::invoke] is yielded as one item.
    fn stream(&self, input: Self::Input) -> BoxStream<'_, Result<Self::Output>> {
        stream::once(self.invoke(input)).boxed()
    }
}

#[async_trait]
impl<R: Runnable + ?Sized> Runnable for Arc<R> {
    type Input = R::Input;
    type Output = R::Output;

    async fn invoke(&self, input: Self::Input) -> Result<Self::Output> {
        (**self).invoke(input).await
    }

    fn stream(&self, input: Self::Input) -> BoxStream<'_, Result<Self::Output>> {
        (**self).stream(input)
    }
}

/// Composition helpers for every [Runnable].
pub trait RunnableExt: Runnable + Sized {
    /// Feed the output of `self` into `next`.
    fn pipe<N>(self, next: N) -> RunnableSequence<Self, N>
        where N: Runnable<Input=Self::Output> {
        RunnableSequence::new(self, next)
    }
}

impl<R: Runnable> RunnableExt for R {}

#[cfg(test)]
mod test_runnable {
    use std::sync::Arc;
    use std::time::Duration;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use futures::StreamExt;
    use super::{Runnable, RunnableConfig, RunnableLambda};

    /// Finishes later for smaller inputs, so completion order is the reverse of input order.
    struct SlowDouble;

    #[async_trait]
    impl Runnable for SlowDouble {
        type Input = u64;
        type Output = u64;

        async fn invoke(&self, input: u64) -> Result<u64> {
            tokio::time::sleep(Duration::from_millis(50 - input * 10)).await;
            Ok(input * 2)
        }
    }

    #[tokio::test]
    async fn test_batch_keeps_input_order() {
        let outputs = SlowDouble.batch(vec![1, 2, 3, 4]).await.unwrap();
        assert_eq!(vec![2, 4, 6, 8], outputs);
    }

    #[tokio::test]
    async fn test_batch_with_bounded_concurrency() {
        let config = RunnableConfig { max_concurrency: Some(2), ..Default::default() };
        let outputs = SlowDouble.batch_with_config(vec![4, 3, 2, 1], &config).await.unwrap();
        assert_eq!(vec![8, 6, 4, 2], outputs);
    }

    #[tokio::test]
    async fn test_batch_empty() {
        let outputs = SlowDouble.batch(vec![]).await.unwrap();
        assert!(outputs.is_empty());
    }

    #[tokio::test]
    async fn test_batch_fails_on_error() {
        let picky = RunnableLambda::new(|x: i64| {
            if x < 0 {
                bail!("negative input {}", x)
            }
            Ok(x)
        });
        let err = picky.batch(vec![1, -2, 3]).await.unwrap_err();
        assert_eq!("negative input -2", err.to_string());
    }

    #[tokio::test]
    async fn test_default_stream_yields_once() {
        let add_one = RunnableLambda::new(|x: i64| Ok(x + 1));
        let chunks: Vec<i64> = add_one.stream(1).map(|c| c.unwrap()).collect().await;
        assert_eq!(vec![2], chunks);
    }

    #[tokio::test]
    async fn test_arc_forwards() {
        let shared = Arc::new(RunnableLambda::new(|x: i64| Ok(x * 3)));
        assert_eq!(9, shared.invoke(3).await.unwrap());
        assert_eq!(vec![3, 6], shared.batch(vec![1, 2]).await.unwrap());
    }
}
