use std::collections::BTreeMap;
use anyhow::Result;
use async_trait::async_trait;
use futures::future::try_join_all;
use crate::runnable::Runnable;

/// Runs named branches concurrently on clones of the same input and collects their outputs by name.
pub struct RunnableParallel<I, O> {
    branches: Vec<(String, Box<dyn Runnable<Input=I, Output=O>>)>,
}

impl<I, O> RunnableParallel<I, O>
    where I: Clone + Send + Sync + 'static,
          O: Send + 'static {
    pub fn new() -> Self {
        Self { branches: Vec::new() }
    }

    /// Add a branch. A branch with an existing name replaces it.
    pub fn with_branch(mut self, name: impl Into<String>, runnable: impl Runnable<Input=I, Output=O> + 'static) -> Self {
        let name = name.into();
        self.branches.retain(|(existing, _)| *existing != name);
        self.branches.push((name, Box::new(runnable)));
        self
    }

    pub fn branch_names(&self) -> Vec<&str> {
        self.branches.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl<I, O> Default for RunnableParallel<I, O>
    where I: Clone + Send + Sync + 'static,
          O: Send + 'static {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I, O> Runnable for RunnableParallel<I, O>
    where I: Clone + Send + Sync + 'static,
          O: Send + 'static {
    type Input = I;
    type Output = BTreeMap<String, O>;

    async fn invoke(&self, input: I) -> Result<BTreeMap<String, O>> {
        let outputs = try_join_all(self.branches.iter().map(|(_, runnable)| runnable.invoke(input.clone()))).await?;
        Ok(self.branches.iter()
            .map(|(name, _)| name.clone())
            .zip(outputs)
            .collect())
    }
}

#[cfg(test)]
mod test_parallel {
    use std::collections::BTreeMap;
    use super::RunnableParallel;
    use crate::runnable::{Runnable, RunnableExt, RunnableLambda};

    fn multipliers() -> RunnableParallel<i64, i64> {
        RunnableParallel::new()
            .with_branch("mulby2", RunnableLambda::new(|x: i64| Ok(x * 2)))
            .with_branch("mulby6", RunnableLambda::new(|x: i64| Ok(x * 6)))
    }

    #[tokio::test]
    async fn test_parallel_after_lambda() {
        let sequence = RunnableLambda::new(|x: i64| Ok(x + 1)).pipe(multipliers());
        let output = sequence.invoke(1).await.unwrap();
        assert_eq!(BTreeMap::from([("mulby2".to_string(), 4), ("mulby6".to_string(), 12)]), output);
    }

    #[tokio::test]
    async fn test_same_name_replaces() {
        let parallel = multipliers().with_branch("mulby2", RunnableLambda::new(|x: i64| Ok(x * 20)));
        assert_eq!(vec!["mulby6", "mulby2"], parallel.branch_names());
        let output = parallel.invoke(1).await.unwrap();
        assert_eq!(20, output["mulby2"]);
    }

    #[tokio::test]
    async fn test_empty_parallel() {
        let parallel: RunnableParallel<i64, i64> = RunnableParallel::default();
        assert!(parallel.invoke(1).await.unwrap().is_empty());
    }
}
