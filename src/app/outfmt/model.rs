use crate::statement::render::CellTable;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputType {
    Holdings,
    Categories,
}

pub type Error = String;

/// Sink strategy for the consolidated output. One run writes the holdings
/// table, then the categories table, then calls finish exactly once; no
/// partial output may be left behind on any failure path.
pub trait SheetWriter {
    fn write_table(
        &mut self,
        out_type: OutputType,
        name: &str,
        table: &CellTable,
    ) -> Result<(), Error>;

    fn finish(self: Box<Self>) -> Result<(), Error> {
        Ok(())
    }
}
