//! CSV export of invoice sequences, buffered or streamed row by row.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use std::io::Write;

use crate::error::{ExportError, StoreError};
use crate::models::invoice::round_cents;
use crate::models::Invoice;

pub static CSV_HEADER: [&str; 7] = [
    "ID",
    "Invoice Number",
    "Total",
    "Date",
    "Status",
    "Active",
    "Formatted Total",
];

/// Column set of an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CsvLayout {
    /// All seven columns, including `Formatted Total`.
    #[default]
    Full,
    /// The first six columns only.
    Compact,
}

impl CsvLayout {
    pub fn header(self) -> &'static [&'static str] {
        match self {
            CsvLayout::Full => &CSV_HEADER,
            CsvLayout::Compact => &CSV_HEADER[..6],
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceCsvExporter {
    layout: CsvLayout,
}

impl InvoiceCsvExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact() -> Self {
        Self::with_layout(CsvLayout::Compact)
    }

    pub fn with_layout(layout: CsvLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> CsvLayout {
        self.layout
    }

    /// Whole export in one buffer: header plus one line per invoice, input
    /// order preserved.
    pub fn export(&self, invoices: &[Invoice]) -> Result<Vec<u8>, ExportError> {
        let mut buffer = Vec::new();
        self.write_to(invoices, &mut buffer)?;
        Ok(buffer)
    }

    pub fn write_to<'a, I, W>(&self, invoices: I, writer: W) -> Result<(), ExportError>
    where
        I: IntoIterator<Item = &'a Invoice>,
        W: Write,
    {
        let mut csv = csv_writer(writer);
        csv.write_record(self.layout.header())?;
        for invoice in invoices {
            csv.write_record(self.record(invoice))?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn header_line(&self) -> Result<Bytes, ExportError> {
        line(self.layout.header())
    }

    pub fn row_line(&self, invoice: &Invoice) -> Result<Bytes, ExportError> {
        line(self.record(invoice))
    }

    /// Header chunk followed by one chunk per row. Rows are pulled from
    /// `rows` only as the consumer polls, so nothing is buffered ahead.
    /// A store error ends the export with that error.
    pub fn export_stream<S>(&self, rows: S) -> impl Stream<Item = Result<Bytes, ExportError>> + Send + 'static
    where
        S: Stream<Item = Result<Invoice, StoreError>> + Send + 'static,
    {
        let exporter = *self;
        let header = stream::once(async move { exporter.header_line() });
        let body = rows.map(move |row| {
            let invoice = row?;
            exporter.row_line(&invoice)
        });
        header.chain(body)
    }

    fn record(&self, invoice: &Invoice) -> Vec<String> {
        let mut fields = vec![
            invoice.id.to_string(),
            invoice.invoice_number.clone(),
            format!("{:.2}", round_cents(invoice.total)),
            invoice.invoice_date.format("%Y-%m-%d").to_string(),
            invoice.status.clone(),
            invoice.active.to_string(),
        ];
        if self.layout == CsvLayout::Full {
            fields.push(invoice.formatted_total());
        }
        fields
    }
}

fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer)
}

fn line<I, T>(record: I) -> Result<Bytes, ExportError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut csv = csv_writer(Vec::new());
    csv.write_record(record)?;
    let buffer = csv.into_inner().map_err(|e| ExportError::Io(e.into_error()))?;
    Ok(Bytes::from(buffer))
}
