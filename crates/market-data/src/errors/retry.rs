/// Classification used by the fetcher to decide what a failed attempt means.
///
/// Every provider failure is retried the same way an empty response is; the
/// class only decides how an exhausted budget is reported.
///
/// | Class | Retried? | Exhausted budget reports |
/// |-------|----------|--------------------------|
/// | `Empty` | Yes | `NoData` |
/// | `Transient` | Yes | `ProviderExhausted` if no attempt was ever `Empty` |
/// | `Terminal` | No | itself |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// The provider answered but had nothing for the window
    /// (unknown symbol, no bars yet).
    Empty,

    /// Timeout, rate limiting, transport or parse failure.
    Transient,

    /// Produced by the fetcher itself once the budget is spent.
    Terminal,
}
