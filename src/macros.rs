/// Builds an [`AttributePatch`](crate::AttributePatch) from `field => value`
/// pairs.
///
/// ```
/// use scopedb::attrs;
///
/// let patch = attrs! { "name" => "foo", "priority" => 3i64 };
/// assert_eq!(patch.len(), 2);
/// ```
#[macro_export]
macro_rules! attrs {
    () => {
        $crate::AttributePatch::new()
    };
    ($($field:expr => $value:expr),+ $(,)?) => {{
        let mut patch = $crate::AttributePatch::new();
        $(
            patch = patch.set($field, $crate::Value::from($value));
        )+
        patch
    }};
}
