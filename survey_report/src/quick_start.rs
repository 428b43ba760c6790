/*!

# Quick start with a Google Sheet

This example shows how to go from a survey collection sheet to a rendered
dashboard summary. It uses Google Forms + Sheets because it is free and the
sheet export is a plain CSV; other providers (Microsoft, Qualtrics) offer the
same kind of export.

**Collecting responses** Create a form with one question per response type.
Each submission should land in the linked sheet as one row per answer with the
columns `timestamp, session_id, type, image_name, metric, value`:

- `type = rating` rows carry the image id in `image_name`, the rating
  dimension (`act`, `mot`, `trust`) in `metric` and the 1-5 score in `value`.
- `type = ab` rows carry the comparison key (`ab1`, `ab2`, ...) in
  `image_name` and the choice (`A`, `B` or `Neither`) in `value`.
- `type = general` rows carry the question key in `image_name` and the chosen
  option in `value`.
- `type = feedback` rows carry the free text in `value`.

**Publishing the sheet** In Google Sheets, use File > Share > Publish to web,
or build the direct export URL:

```text
https://docs.google.com/spreadsheets/d/<sheet id>/export?format=csv&gid=0
```

**Running the dashboard** Point `survdash` at the export URL:

```bash
survdash --url 'https://docs.google.com/spreadsheets/d/<sheet id>/export?format=csv&gid=0'
```

The summary is written as JSON: one entry per dashboard section with its chart
descriptor, ready for a rendering layer. Repeated runs within the cache window
(60 seconds by default) reuse the last snapshot instead of re-fetching.

**Using the library directly** The same engine is available without the
loader:

```
use survey_report::builder::SnapshotBuilder;
use survey_report::{run_survey_stats, ReportOptions};

let mut builder = SnapshotBuilder::new();
builder.add_row("3/14/2025 09:26:53", "s1", "rating", "img1", Some("act"), "4")?;
builder.add_row("3/14/2025 09:27:10", "s2", "ab", "ab1", None, "A")?;

let summary = run_survey_stats(&builder.build(), &ReportOptions::default())?;
assert_eq!(summary.kpis.unique_participants, 2);
# Ok::<(), Box<dyn std::error::Error>>(())
```

*/
