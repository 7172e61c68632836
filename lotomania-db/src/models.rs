use anyhow::{bail, Context, Result};

/// Nombre de numéros possibles (00 à 99).
pub const POOL_SIZE: usize = 100;

/// Nombre de numéros tirés par concours.
pub const DRAW_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pub contest: u32,
    pub date: String,
    pub numbers: [u8; DRAW_SIZE],
}

impl Draw {
    pub fn numbers_csv(&self) -> String {
        format_numbers_csv(&self.numbers)
    }
}

/// Vérifie un tirage (20 numéros distincts dans 0-99) et le renvoie trié.
pub fn validate_numbers(numbers: &[u8]) -> Result<[u8; DRAW_SIZE]> {
    if numbers.len() != DRAW_SIZE {
        bail!("{} numéros attendus, {} reçus", DRAW_SIZE, numbers.len());
    }
    let mut sorted = [0u8; DRAW_SIZE];
    sorted.copy_from_slice(numbers);
    sorted.sort_unstable();

    for &n in &sorted {
        if n as usize >= POOL_SIZE {
            bail!("Numéro {} hors limites (0-99)", n);
        }
    }
    for w in sorted.windows(2) {
        if w[0] == w[1] {
            bail!("Numéro en double : {:02}", w[0]);
        }
    }
    Ok(sorted)
}

/// "00,07,13" : format de stockage des numéros.
pub fn format_numbers_csv(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:02}", n))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn parse_numbers_csv(raw: &str) -> Result<Vec<u8>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u8>()
                .with_context(|| format!("Numéro illisible : '{}'", s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twenty_from(start: u8) -> Vec<u8> {
        (start..start + 20).collect()
    }

    #[test]
    fn test_validate_numbers_ok() {
        let sorted = validate_numbers(&twenty_from(0)).unwrap();
        assert_eq!(sorted[0], 0);
        assert_eq!(sorted[19], 19);

        let mut shuffled = twenty_from(80);
        shuffled.reverse();
        let sorted = validate_numbers(&shuffled).unwrap();
        assert!(sorted.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(sorted[19], 99);
    }

    #[test]
    fn test_validate_numbers_wrong_count() {
        assert!(validate_numbers(&[1, 2, 3]).is_err());
        assert!(validate_numbers(&twenty_from(0)[..19]).is_err());
    }

    #[test]
    fn test_validate_numbers_out_of_range() {
        let mut nums = twenty_from(0);
        nums[5] = 100;
        assert!(validate_numbers(&nums).is_err());
    }

    #[test]
    fn test_validate_numbers_duplicate() {
        let mut nums = twenty_from(0);
        nums[19] = 0;
        assert!(validate_numbers(&nums).is_err());
    }

    #[test]
    fn test_numbers_csv_format() {
        assert_eq!(format_numbers_csv(&[0, 7, 42, 99]), "00,07,42,99");
        assert_eq!(format_numbers_csv(&[]), "");
    }

    #[test]
    fn test_parse_numbers_csv() {
        assert_eq!(parse_numbers_csv("00,07,42,99").unwrap(), vec![0, 7, 42, 99]);
        assert_eq!(parse_numbers_csv(" 3 , 4 ,").unwrap(), vec![3, 4]);
        assert!(parse_numbers_csv("01,xx").is_err());
    }
}
