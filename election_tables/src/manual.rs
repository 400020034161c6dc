/*!

This is the long-form manual for `election_tables` and `eltab`.

## Overview

An election is described by a JSON configuration file. It lists the source
files, the base administrative units, the parties, and the role of each table:
which rows and columns hold the capacities, the valid votes, the elected
counts and the votes of each party.

The district side and the proportional side are independent: an election may
describe only one of them.

```bash
eltab --config councillors_2022.json --out result.json
eltab --config councillors_2022.json --reference councillors_2022_expected.json
```

## Source formats

* `excel` (or `xlsx`) every worksheet of the workbook becomes a table, named
  `prefix/sheet` when a `prefix` is given and `sheet` otherwise.
* `csv` the file becomes one table, named by `tableId` or by the name of the
  file without its extension. The file has no header line and may have rows of
  different lengths.

The paths are relative to the configuration file.

## Positions

Rows and columns are numbers counted from `indexBase` (0 or 1, 1 by default).
Columns may also be given with Excel letters (`"C"`, `"AK"`), whatever the base.

## Cell contents

The sources are read leniently. A cell that cannot be understood reads as 0:
blank cells are common for the parties that did not run in a unit.

* elected counts: a text such as `"2   1   3"` (new, incumbent, total) reads
  as its last number.
* capacities: the numbers of an annotated figure are added: `"6(1)"` is 7 seats.
* votes: commas and full-width digits are accepted. With the `grouped`
  notation (the default), a real cell such as `879.676` holds 879,676 votes.
  With `decimal`, real cells are apportioned votes and are rounded.

## Parties

```json
"parties": {
  "known": ["自由民主党", "立憲民主党"],
  "aliases": [{ "from": "自民党", "to": "自由民主党" }]
}
```

The names found in the headers are cleaned (spaces and footnotes starting
with `※` are removed) and the aliases are applied. A header naming a known
party is reported under the known name.

## Finding the party columns

`partyColumns` describes how the columns of the parties are found:

* `fixed`: `columns` lists `{ "party", "column", "span" }`.
* `stride`: from `firstColumn` to `lastColumn` of `headerRow`, every non-empty
  cell that is not in `excluded` names a party occupying `stride` columns.
* `labels`: every cell of `headerRow` that names a known party starts a span
  of `window` columns (10 by default).

Several columns of the same party in one table are added.

## The district side

```json
"district": {
  "mergeTable": [{ "unit": "鳥取", "district": "鳥取・島根" }],
  "districtOrder": ["鳥取・島根"],
  "tables": [ ... ]
}
```

Units without an entry in `mergeTable` are districts of their own. The
districts are listed in `districtOrder`, or in the order of their first unit.

Each table has a `figure`:

* `capacity`: the seats to fill, in `column`.
* `validVotes`: the first non-zero value among `columns`.
* `seats`: the elected counts, in the last non-zero cell of each party span.
* `votes`: the votes, in the cell at `valueOffset` of each party span.

The data rows start at `firstRow` and follow the order of the units
(`"keyedBy": "units"`, the default) or of the districts (`"districts"`).
`restatedRows` lists `{ "district", "row" }` rows that state the figures of a
merged district directly: their non-zero values replace the sums of the units.

When several tables give the same figure for a unit, the first non-zero value
is kept: later tables only complete the figures still at zero. When
no table gives the valid votes of a district, the sum of the party votes is used.

## The proportional side

```json
"proportional": {
  "blocks": [{ "name": "北海道", "members": ["北海道"], "totalSeats": 8, "tables": [ ... ] }],
  "summaries": [ ... ]
}
```

The seats of a block are `totalSeats` when given, otherwise the quota read in
the summary tables, otherwise the sum of the elected counts.

The tables of a block have a `kind`:

* `ranking`: parties ranked by votes. `groups` lists the `rankColumn`,
  `partyColumn`, `votesColumn` and optional `rateColumn` of each ranking of the
  table. Rows without a numeric rank are skipped, except the row labeled
  `totalLabel` (`得票総数` by default) which holds the total votes of the block.
* `partyDetail`: the list tables of the parties. `tables` are searched for the
  known parties in `headerRow`; the elected count (`3人`, see `electedSuffix`)
  is read in `seatsRow` and the votes in `votesRow`.
* `partyRow`: one `row` holding a `figure` (`seats`, `votes` or `rates`) for
  each party of `partyColumns`.

A summary table covers all the blocks. A row whose `labelColumns` mention a
block (its name, or one of its `labels`) starts the rows of that block. The
total row of the block is the one whose `markerColumn` contains `totalMarker`
(`計` by default). A block made of a single unit has no total row: the row of
its unit is used unless its marker is one of `subheaderMarkers`. The total row
gives the `figure` of each party, and optionally the total votes
(`totalVotesColumn`) and the quota (`quotaColumn`).

Figures restated by several tables of a block are merged by keeping the largest value.

## Output

```json
{
  "year": 2022,
  "electionDate": "2022-07-10",
  "proportional": { "totalSeats": 6, "blocks": [ ... ] },
  "district": { "totalSeats": 2, "units": [ ... ] }
}
```

Parties without seats nor votes are dropped. The others are sorted by seats,
then by votes. The vote rates are percentages rounded to 2 decimals, over the
valid votes of the district or the total votes of the block; a rate stated by
a ranking table is used as is.

## Warnings

Inconsistencies never stop the extraction. They are logged and printed on the
standard error:
* the elected counts of a district or a block do not add up to its seats
* a party appears in the vote tables but not in the seat tables (or the reverse)

*/
