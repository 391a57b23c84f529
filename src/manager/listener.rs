/// Callback fired after each successful configuration load.
pub trait PropertyChangeListener: Send + Sync {
    fn properties_changed(&self);
}

impl<F> PropertyChangeListener for F
where
    F: Fn() + Send + Sync,
{
    fn properties_changed(&self) {
        self();
    }
}
