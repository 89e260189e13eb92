use crate::value_objects::snapshot::PortfolioSnapshot;

pub trait FrameRenderer {
    /// Renders the snapshot into an encoded PNG frame.
    fn render_frame(&self, snapshot: &PortfolioSnapshot) -> Result<Vec<u8>, String>;
}

pub trait FrameSink {
    /// Replaces the previously published frame. Readers never observe a
    /// partially written frame.
    fn publish(&self, frame: &[u8]) -> Result<(), String>;

    fn describe(&self) -> String;
}
