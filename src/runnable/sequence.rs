use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use crate::runnable::Runnable;

/// Two runnables run back to back; longer chains nest. Build one with [RunnableExt::pipe](crate::runnable::RunnableExt::pipe).
pub struct RunnableSequence<A, B> {
    first: A,
    second: B,
}

impl<A, B> RunnableSequence<A, B>
    where A: Runnable,
          B: Runnable<Input=A::Output> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }
}

#[async_trait]
impl<A, B> Runnable for RunnableSequence<A, B>
    where A: Runnable,
          B: Runnable<Input=A::Output> {
    type Input = A::Input;
    type Output = B::Output;

    async fn invoke(&self, input: A::Input) -> Result<B::Output> {
        let intermediate = self.first.invoke(input).await?;
        self.second.invoke(intermediate).await
    }

    /// Invokes the first step, then streams the second one.
    fn stream(&self, input: A::Input) -> BoxStream<'_, Result<B::Output>> {
        stream::once(self.first.invoke(input))
            .map_ok(move |intermediate| self.second.stream(intermediate))
            .try_flatten()
            .boxed()
    }
}

#[cfg(test)]
mod test_sequence {
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
    use crate::runnable::{Runnable, RunnableExt, RunnableLambda};

    /// Streams the characters of its input one by one.
    struct Spell;

    #[async_trait]
    impl Runnable for Spell {
        type Input = String;
        type Output = String;

        async fn invoke(&self, input: String) -> Result<String> {
            Ok(input)
        }

        fn stream(&self, input: String) -> BoxStream<'_, Result<String>> {
            let chars: Vec<Result<String>> = input.chars().map(|c| Ok(c.to_string())).collect();
            stream::iter(chars).boxed()
        }
    }

    #[tokio::test]
    async fn test_pipe_composes() {
        let sequence = RunnableLambda::new(|x: i64| Ok(x + 1))
            .pipe(RunnableLambda::new(|x: i64| Ok(x * 4)));
        assert_eq!(8, sequence.invoke(1).await.unwrap());
        assert_eq!(vec![12, 16], sequence.batch(vec![2, 3]).await.unwrap());
    }

    #[tokio::test]
    async fn test_error_short_circuits() {
        let sequence = RunnableLambda::new(|_: i64| -> Result<i64> { Err(anyhow!("boom")) })
            .pipe(RunnableLambda::new(|x: i64| -> Result<i64> { panic!("must not run with {}", x) }));
        assert_eq!("boom", sequence.invoke(1).await.unwrap_err().to_string());
    }

    #[tokio::test]
    async fn test_stream_streams_last_step() {
        let sequence = RunnableLambda::new(|s: String| Ok(format!("{}!", s))).pipe(Spell);
        let chunks: Vec<String> = sequence.stream("go".to_string()).try_collect().await.unwrap();
        assert_eq!(vec!["g", "o", "!"], chunks);
    }
}
