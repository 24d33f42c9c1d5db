use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One raw row of the semicolon-delimited source extract.
///
/// Every field is read as optional text; the loader decides what parses,
/// what becomes null and what disqualifies the row. Columns that are absent
/// from the file altogether deserialize as `None` via `serde(default)`.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "ANNO", default)]
    pub year: Option<String>,
    #[serde(rename = "TRIMESTRE", default)]
    pub quarter: Option<String>,
    #[serde(rename = "EMPRESA", default)]
    pub operator: Option<String>,
    #[serde(rename = "SERVICIO_PAQUETE", default)]
    pub package: Option<String>,
    #[serde(rename = "DEPARTAMENTO", default)]
    pub department: Option<String>,
    #[serde(rename = "SEGMENTO", default)]
    pub segment: Option<String>,
    #[serde(rename = "VELOCIDAD_EFECTIVA_DOWNSTREAM", default)]
    pub downstream_speed: Option<String>,
    #[serde(rename = "VELOCIDAD_EFECTIVA_UPSTREAM", default)]
    pub upstream_speed: Option<String>,
    #[serde(rename = "VALOR_FACTURADO_O_COBRADO", default)]
    pub billed_amount: Option<String>,
    #[serde(rename = "OTROS_VALORES_FACTURADOS", default)]
    pub other_billed: Option<String>,
    #[serde(rename = "CANTIDAD_LINEAS_ACCESOS", default)]
    pub lines_count: Option<String>,
}

/// One cleaned service-bundle record.
///
/// `billed_amount` and `other_billed` are guaranteed non-negative; rows where
/// either was negative or unparseable never make it into the cleaned set.
/// `value_per_line` is `None` when `lines_count` is zero or missing.
#[derive(Debug, Clone)]
pub struct Record {
    pub year: i32,
    pub quarter: Option<i32>,
    pub operator: Option<String>,
    pub package: Option<String>,
    pub department: Option<String>,
    pub segment: Option<String>,
    pub downstream_speed: Option<f64>,
    pub upstream_speed: Option<f64>,
    pub billed_amount: f64,
    pub other_billed: f64,
    pub lines_count: Option<f64>,
    pub value_per_line: Option<f64>,
}

/// Which optional columns the loaded file actually carries.
///
/// Determined once from the header row; the filter engine and the report
/// functions consult these flags instead of re-checking column presence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Schema {
    pub has_package: bool,
    pub has_department: bool,
    pub has_segment: bool,
    pub has_quarter: bool,
}

/// The cleaned table plus its capability flags, immutable after loading.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<Record>,
    pub schema: Schema,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct YearCountRow {
    #[serde(rename = "ANNO")]
    #[tabled(rename = "ANNO")]
    pub year: String,
    #[serde(rename = "REGISTROS")]
    #[tabled(rename = "REGISTROS")]
    pub records: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DepartmentValueRow {
    #[serde(rename = "DEPARTAMENTO")]
    #[tabled(rename = "DEPARTAMENTO")]
    pub department: String,
    #[serde(rename = "VALOR_FACTURADO")]
    #[tabled(rename = "VALOR_FACTURADO")]
    pub billed: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PackageCountRow {
    #[serde(rename = "SERVICIO_PAQUETE")]
    #[tabled(rename = "SERVICIO_PAQUETE")]
    pub package: String,
    #[serde(rename = "REGISTROS")]
    #[tabled(rename = "REGISTROS")]
    pub records: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct QuarterTrendRow {
    #[serde(rename = "PERIODO")]
    #[tabled(rename = "PERIODO")]
    pub period: String,
    #[serde(rename = "VALOR_FACTURADO")]
    #[tabled(rename = "VALOR_FACTURADO")]
    pub billed: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct OperatorValueRow {
    #[serde(rename = "RANK")]
    #[tabled(rename = "RANK")]
    pub rank: usize,
    #[serde(rename = "EMPRESA")]
    #[tabled(rename = "EMPRESA")]
    pub operator: String,
    #[serde(rename = "VALOR_FACTURADO")]
    #[tabled(rename = "VALOR_FACTURADO")]
    pub billed: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SegmentLinesRow {
    #[serde(rename = "SEGMENTO")]
    #[tabled(rename = "SEGMENTO")]
    pub segment: String,
    #[serde(rename = "LINEAS_ACCESOS")]
    #[tabled(rename = "LINEAS_ACCESOS")]
    pub lines: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PackageLinesRow {
    #[serde(rename = "SERVICIO_PAQUETE")]
    #[tabled(rename = "SERVICIO_PAQUETE")]
    pub package: String,
    #[serde(rename = "LINEAS_ACCESOS")]
    #[tabled(rename = "LINEAS_ACCESOS")]
    pub lines: String,
}

/// Console-only preview of a filtered row, mirroring the source column order.
#[derive(Debug, Tabled, Clone)]
pub struct PreviewRow {
    #[tabled(rename = "ANNO")]
    pub year: i32,
    #[tabled(rename = "TRIMESTRE")]
    pub quarter: String,
    #[tabled(rename = "EMPRESA")]
    pub operator: String,
    #[tabled(rename = "SERVICIO_PAQUETE")]
    pub package: String,
    #[tabled(rename = "DEPARTAMENTO")]
    pub department: String,
    #[tabled(rename = "SEGMENTO")]
    pub segment: String,
    #[tabled(rename = "VEL_DOWNSTREAM")]
    pub downstream_speed: String,
    #[tabled(rename = "VEL_UPSTREAM")]
    pub upstream_speed: String,
    #[tabled(rename = "VALOR_FACTURADO")]
    pub billed: String,
    #[tabled(rename = "OTROS_VALORES")]
    pub other_billed: String,
    #[tabled(rename = "LINEAS_ACCESOS")]
    pub lines: String,
    #[tabled(rename = "VALOR_POR_LINEA")]
    pub value_per_line: String,
}

/// Scalar metrics shown above the report tables.
///
/// The sums are `None` when every contributing value was null; "no data" and
/// zero are different answers and the console prints `N/A` for the former.
#[derive(Debug, Serialize)]
pub struct SummaryMetrics {
    pub total_records: usize,
    pub total_lines: Option<f64>,
    pub total_billed: Option<f64>,
    pub distinct_operators: usize,
}

/// Distribution of the derived per-line value over a filtered view.
#[derive(Debug, Clone, Serialize)]
pub struct PerLineStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}
