//! HTML rendering for the probe page.

use crate::probe::DisplayRecord;
use crate::util::escape_html;

/// Render the index page for a probed record. Every field is escaped.
pub fn render_index(record: &DisplayRecord) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>Secrets Probe</title>
</head>
<body>
    <main>
        <h1>Secrets Probe</h1>
        <dl>
            <dt>Storage connection (env)</dt>
            <dd id="storage-connection">{storage}</dd>
            <dt>Service Bus connection (env)</dt>
            <dd id="sb-connection">{sb}</dd>
            <dt>Mounted secret</dt>
            <dd id="mount-data">{mount}</dd>
        </dl>
    </main>
</body>
</html>
"#,
        storage = escape_html(&record.storage_connection),
        sb = escape_html(&record.sb_connection),
        mount = escape_html(&record.mount_data),
    )
}
