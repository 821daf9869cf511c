/// Accumulates items one at a time and turns them into a final value.
///
/// `add` takes an `Item` OR anything that implements `Into<Item>`,
/// which lets callers feed points by value or by reference.
///
/// `fold` merges two partial aggregations of the same kind, which is
/// how the per-scan aggregations built in parallel get combined.
pub trait Aggregator: Send + Sync {
    type Item: Send + Sync + Clone;
    type Output: Send + Sync;

    fn add(&mut self, item: impl Into<Self::Item>);
    fn fold(&mut self, other: Self);
    fn finalize(self) -> Self::Output;

    fn add_all<I, T>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Self::Item>,
    {
        for item in items {
            self.add(item);
        }
    }
}
