//! Macros for declaring edge lists.

/// Build a `Vec<Edge>` from `source => target` rows, each optionally
/// followed by `: transition`.
///
/// # Example
///
/// ```
/// use waypoint::edges;
///
/// let edges = edges![
///     "idle" => "load" : "loading",
///     "load" => "aim" : "aiming",
///     "aim" => "fire",
/// ];
///
/// assert_eq!(edges.len(), 3);
/// assert_eq!(edges[0].transition.as_deref(), Some("loading"));
/// assert!(edges[2].transition.is_none());
/// ```
#[macro_export]
macro_rules! edges {
    (@transition) => {
        ::core::option::Option::None
    };
    (@transition $transition:expr) => {
        ::core::option::Option::Some($transition)
    };
    (
        $(
            $source:literal => $target:literal $(: $transition:literal)?
        ),* $(,)?
    ) => {
        vec![
            $(
                $crate::core::Edge::new(
                    $source,
                    $target,
                    $crate::edges!(@transition $($transition)?),
                )
            ),*
        ]
    };
}
