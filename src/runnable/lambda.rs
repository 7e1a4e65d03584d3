use std::marker::PhantomData;
use anyhow::Result;
use async_trait::async_trait;
use crate::runnable::Runnable;

/// Turns a closure into a [Runnable].
///
/// ```
/// use chainprompt::runnable::{Runnable, RunnableLambda};
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let add_one = RunnableLambda::new(|x: i64| Ok(x + 1));
/// assert_eq!(2, add_one.invoke(1).await.unwrap());
/// # }
/// ```
pub struct RunnableLambda<F, I, O> {
    func: F,
    _marker: PhantomData<fn(I) -> O>,
}

impl<F, I, O> RunnableLambda<F, I, O>
    where F: Fn(I) -> Result<O> + Send + Sync {
    pub fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<F, I, O> Runnable for RunnableLambda<F, I, O>
    where F: Fn(I) -> Result<O> + Send + Sync,
          I: Send + 'static,
          O: Send + 'static {
    type Input = I;
    type Output = O;

    async fn invoke(&self, input: I) -> Result<O> {
        (self.func)(input)
    }
}

#[cfg(test)]
mod test_lambda {
    use super::RunnableLambda;
    use crate::runnable::Runnable;

    #[tokio::test]
    async fn test_invoke_and_batch() {
        let add_one = RunnableLambda::new(|x: i64| Ok(x + 1));
        assert_eq!(2, add_one.invoke(1).await.unwrap());
        assert_eq!(vec![3, 4], add_one.batch(vec![2, 3]).await.unwrap());
    }

    #[tokio::test]
    async fn test_string_lambda() {
        let shout = RunnableLambda::new(|s: String| Ok(s.to_uppercase()));
        assert_eq!("CRICKET", shout.invoke("cricket".to_string()).await.unwrap());
    }
}
