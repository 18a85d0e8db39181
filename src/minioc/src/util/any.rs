use std::any::{self, Any};

pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        any::type_name::<T>()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    trait Trait: AsAny + Send + Sync {}

    impl<T: Send + Sync + 'static> Trait for Arc<T> {}

    #[test]
    fn as_any_succeeds_when_receiver_is_a_trait_object() {
        let x: Box<dyn Trait> = Box::new(Arc::new(42i32));

        assert_eq!(x.as_ref().as_any().downcast_ref::<Arc<i32>>().map(|v| **v), Some(42));
        assert_eq!(x.as_ref().type_name(), any::type_name::<Arc<i32>>());
    }
}
