use std::collections::BTreeMap;

use tracing::warn;

use crate::errors::NamebaseError;
use crate::facts::FactRecord;
use crate::types::Name;
use crate::utils::{csv_fields, title_case};
use crate::vocab::{GenderFlag, Relationship};

/// Records contributed by one nickname source, keyed by name.
pub type SourceRecords = BTreeMap<Name, FactRecord>;

/// Known line formats of the cached nickname lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NicknameFormat {
    /// `name<TAB>nick nick ...`; a trailing `E` on a nick expands to the
    /// `i`/`ie`/`ey`/`y` endings.
    Brianary,
    /// `name,nick,nick,...`, title-cased.
    CarltonNorthern,
    /// `name,nick,...` with the gender taken from the file name prefix.
    HaJongler,
    /// `nick<TAB>name<TAB>score` with `#` comments.
    Meranda,
    /// `id,name,nick` with a header row, title-cased.
    OnyxRev,
    /// `firstname,nick,...` with a header row, title-cased.
    MrCsabaToth,
}

impl NicknameFormat {
    /// Every format, in source enumeration order.
    pub const ALL: [NicknameFormat; 6] = [
        NicknameFormat::Brianary,
        NicknameFormat::CarltonNorthern,
        NicknameFormat::HaJongler,
        NicknameFormat::Meranda,
        NicknameFormat::OnyxRev,
        NicknameFormat::MrCsabaToth,
    ];

    /// Source identifier, also the cache sub-directory name.
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Brianary => "brianary",
            Self::CarltonNorthern => "carltonnorthern",
            Self::HaJongler => "hajongler",
            Self::Meranda => "meranda",
            Self::OnyxRev => "onyxrev",
            Self::MrCsabaToth => "mrcsabatoth",
        }
    }

    /// Format for a source identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.id() == id)
    }

    /// Parse one cached file into `records`.
    ///
    /// `file_name` matters only for sources that encode data in it. Lines the
    /// format cannot interpret are skipped with a warning; returns how many.
    pub fn parse_into(
        &self,
        file_name: &str,
        text: &str,
        records: &mut SourceRecords,
    ) -> Result<usize, NamebaseError> {
        let mut builder = RecordBuilder { records };
        let mut skipped = 0;
        let gender = match self {
            Self::HaJongler => hajongler_gender(file_name),
            _ => GenderFlag::empty(),
        };
        for line in text.lines() {
            let handled = match self {
                Self::Brianary => brianary_line(line, &mut builder)?,
                Self::CarltonNorthern => carltonnorthern_line(line, &mut builder)?,
                Self::HaJongler => hajongler_line(line, gender, &mut builder)?,
                Self::Meranda => meranda_line(line, &mut builder)?,
                Self::OnyxRev => onyxrev_line(line, &mut builder)?,
                Self::MrCsabaToth => mrcsabatoth_line(line, &mut builder)?,
            };
            if !handled {
                warn!(source = self.id(), file_name, line = %line.trim_end(), "skipping malformed line");
                skipped += 1;
            }
        }
        Ok(skipped)
    }
}

struct RecordBuilder<'a> {
    records: &'a mut SourceRecords,
}

impl RecordBuilder<'_> {
    fn add_nick(&mut self, name: &str, nick: &str) -> Result<(), NamebaseError> {
        if name.is_empty() || nick.is_empty() {
            return Ok(());
        }
        self.records
            .entry(nick.to_string())
            .or_default()
            .add_to_set(Relationship::IsShortFor.field_name(), name)
    }

    fn add_gender(&mut self, name: &str, gender: GenderFlag) -> Result<(), NamebaseError> {
        if name.is_empty() {
            return Ok(());
        }
        self.records
            .entry(name.to_string())
            .or_default()
            .add_gender(gender)
    }
}

const BRIANARY_ENDINGS: [&str; 4] = ["i", "ie", "ey", "y"];

fn brianary_line(line: &str, builder: &mut RecordBuilder<'_>) -> Result<bool, NamebaseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(true);
    }
    let Some((name, nicks)) = line.split_once('\t') else {
        return Ok(false);
    };
    for nick in nicks.split(' ').filter(|nick| !nick.is_empty()) {
        match nick.strip_suffix('E') {
            Some(root) => {
                for ending in BRIANARY_ENDINGS {
                    let expanded = format!("{root}{ending}");
                    if expanded != name {
                        builder.add_nick(name, &expanded)?;
                    }
                }
            }
            None => builder.add_nick(name, nick)?,
        }
    }
    Ok(true)
}

fn carltonnorthern_line(line: &str, builder: &mut RecordBuilder<'_>) -> Result<bool, NamebaseError> {
    let fields = csv_fields(line);
    let Some((name, nicks)) = fields.split_first() else {
        return Ok(true);
    };
    let name = title_case(name);
    for nick in nicks {
        builder.add_nick(&name, &title_case(nick))?;
    }
    Ok(true)
}

fn hajongler_gender(file_name: &str) -> GenderFlag {
    match file_name.split('_').next() {
        Some("female") => GenderFlag::FEMALE,
        _ => GenderFlag::MALE,
    }
}

fn hajongler_line(
    line: &str,
    gender: GenderFlag,
    builder: &mut RecordBuilder<'_>,
) -> Result<bool, NamebaseError> {
    let fields = csv_fields(line);
    let Some((name, nicks)) = fields.split_first() else {
        return Ok(true);
    };
    builder.add_gender(name, gender)?;
    for nick in nicks {
        builder.add_gender(nick, gender)?;
        builder.add_nick(name, nick)?;
    }
    Ok(true)
}

/// One line of the list is padded with spaces instead of tabs.
const MERANDA_BROKEN_LINE: &str = "  GEORGINE        0";
const MERANDA_FIXED_LINE: &str = "\tGEORGINE\t0";

fn meranda_line(line: &str, builder: &mut RecordBuilder<'_>) -> Result<bool, NamebaseError> {
    if line.starts_with('#') || line.trim().is_empty() {
        return Ok(true);
    }
    let line = line
        .replace(MERANDA_BROKEN_LINE, MERANDA_FIXED_LINE)
        .trim()
        .to_lowercase()
        .replace("\t\t", "\t");
    let pieces: Vec<&str> = line.split('\t').collect();
    let [nick, name, _score] = pieces.as_slice() else {
        return Ok(false);
    };
    builder.add_nick(&title_case(name), &title_case(nick))?;
    Ok(true)
}

fn onyxrev_line(line: &str, builder: &mut RecordBuilder<'_>) -> Result<bool, NamebaseError> {
    if line.starts_with("id,") || line.trim().is_empty() {
        return Ok(true);
    }
    let titled = title_case(line);
    let pieces: Vec<&str> = titled.split(',').map(str::trim).collect();
    let (Some(name), Some(nick)) = (pieces.get(1), pieces.get(2)) else {
        return Ok(false);
    };
    if name != nick {
        builder.add_nick(name, nick)?;
    }
    Ok(true)
}

fn mrcsabatoth_line(line: &str, builder: &mut RecordBuilder<'_>) -> Result<bool, NamebaseError> {
    if line.starts_with("firstname") {
        return Ok(true);
    }
    let titled = title_case(line.trim());
    let fields = csv_fields(&titled);
    let Some((name, nicks)) = fields.split_first() else {
        return Ok(true);
    };
    for nick in nicks {
        builder.add_nick(name, nick)?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::FactValue;

    fn parse(format: NicknameFormat, file_name: &str, text: &str) -> (SourceRecords, usize) {
        let mut records = SourceRecords::new();
        let skipped = format.parse_into(file_name, text, &mut records).unwrap();
        (records, skipped)
    }

    fn short_for(records: &SourceRecords, nick: &str) -> Option<FactValue> {
        records.get(nick)?.get("is_short_for").cloned()
    }

    #[test]
    fn brianary_expands_e_suffixed_nicknames() {
        let (records, skipped) = parse(
            NicknameFormat::Brianary,
            "nicknames.txt",
            "Abigail\tAbby Gail\nFreddy\tFreddE\nbroken line\n",
        );
        assert_eq!(skipped, 1);
        assert_eq!(short_for(&records, "Abby"), Some(FactValue::set(["Abigail"])));
        assert_eq!(short_for(&records, "Freddi"), Some(FactValue::set(["Freddy"])));
        assert_eq!(short_for(&records, "Freddey"), Some(FactValue::set(["Freddy"])));
        assert!(!records.contains_key("Freddy"));
    }

    #[test]
    fn carltonnorthern_title_cases_every_name() {
        let (records, _) = parse(
            NicknameFormat::CarltonNorthern,
            "names.csv",
            "aaron,erin,ronnie\nabigail,abby\n",
        );
        assert_eq!(short_for(&records, "Ronnie"), Some(FactValue::set(["Aaron"])));
        assert_eq!(short_for(&records, "Abby"), Some(FactValue::set(["Abigail"])));
    }

    #[test]
    fn hajongler_takes_gender_from_the_file_name() {
        let (female, _) = parse(
            NicknameFormat::HaJongler,
            "female_diminutives.csv",
            "Anna,Annie,Ann\n",
        );
        assert_eq!(female["Anna"].gender(), GenderFlag::FEMALE);
        assert_eq!(female["Annie"].gender(), GenderFlag::FEMALE);
        assert_eq!(short_for(&female, "Ann"), Some(FactValue::set(["Anna"])));

        let (male, _) = parse(NicknameFormat::HaJongler, "male_diminutives.csv", "John,Jack\n");
        assert_eq!(male["Jack"].gender(), GenderFlag::MALE);
    }

    #[test]
    fn meranda_skips_comments_and_repairs_the_padded_line() {
        let text = "# comment\nABBIE\tABIGAIL\t0.9\nGEORGIE  GEORGINE        0\nBAD\tLINE\n";
        let (records, skipped) = parse(NicknameFormat::Meranda, "nicknames.txt", text);
        assert_eq!(skipped, 1);
        assert_eq!(short_for(&records, "Abbie"), Some(FactValue::set(["Abigail"])));
        assert_eq!(short_for(&records, "Georgie"), Some(FactValue::set(["Georgine"])));
    }

    #[test]
    fn onyxrev_skips_header_and_identical_pairs() {
        let text = "id,name,nickname\n1,aaron,erin\n2,anna,ANNA\n3\n";
        let (records, skipped) = parse(NicknameFormat::OnyxRev, "nicknames.csv", text);
        assert_eq!(skipped, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(short_for(&records, "Erin"), Some(FactValue::set(["Aaron"])));
    }

    #[test]
    fn mrcsabatoth_skips_header() {
        let text = "firstname,nick1,nick2\nROBERT,BOB,ROB\n";
        let (records, _) = parse(NicknameFormat::MrCsabaToth, "name_to_nick.csv", text);
        assert_eq!(short_for(&records, "Bob"), Some(FactValue::set(["Robert"])));
        assert_eq!(short_for(&records, "Rob"), Some(FactValue::set(["Robert"])));
        assert!(!records.contains_key("Firstname"));
    }

    #[test]
    fn ids_round_trip() {
        for format in NicknameFormat::ALL {
            assert_eq!(NicknameFormat::from_id(format.id()), Some(format));
        }
        assert_eq!(NicknameFormat::from_id("unknown"), None);
    }
}
