//! Prompt command parsing.

use rakugaki_server::{domain::OperationKind, infrastructure::dto::websocket::PointDto};

use crate::error::CommandError;

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `stroke x,y x,y ...` / `erase x,y ...`
    Draw {
        kind: OperationKind,
        path: Vec<PointDto>,
    },
    /// `color <c>`
    Color(String),
    /// `width <w>`
    Width(f64),
    Undo,
    Redo,
    /// `move x,y`
    Move(PointDto),
    /// Ask the server for a fresh snapshot
    Sync,
    Who,
    Show,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(CommandError::Unknown(String::new()));
        };
        let args: Vec<&str> = words.collect();

        match name.to_ascii_lowercase().as_str() {
            "stroke" | "s" => parse_draw(OperationKind::Stroke, "stroke", &args),
            "erase" | "e" => parse_draw(OperationKind::Erase, "erase", &args),
            "color" => match args.first() {
                Some(color) => Ok(Command::Color(color.to_string())),
                None => Err(CommandError::MissingArgument("color")),
            },
            "width" => {
                let raw = args.first().ok_or(CommandError::MissingArgument("width"))?;
                match raw.parse::<f64>() {
                    Ok(width) if width.is_finite() && width >= 0.0 => Ok(Command::Width(width)),
                    _ => Err(CommandError::InvalidWidth(raw.to_string())),
                }
            }
            "undo" | "u" => Ok(Command::Undo),
            "redo" | "r" => Ok(Command::Redo),
            "move" | "m" => {
                let raw = args.first().ok_or(CommandError::MissingArgument("move"))?;
                Ok(Command::Move(parse_point(raw)?))
            }
            "sync" => Ok(Command::Sync),
            "who" => Ok(Command::Who),
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(name.to_string())),
        }
    }
}

fn parse_draw(
    kind: OperationKind,
    name: &'static str,
    args: &[&str],
) -> Result<Command, CommandError> {
    if args.is_empty() {
        return Err(CommandError::MissingArgument(name));
    }
    let path = args
        .iter()
        .map(|raw| parse_point(raw))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Command::Draw { kind, path })
}

fn parse_point(raw: &str) -> Result<PointDto, CommandError> {
    let invalid = || CommandError::InvalidPoint(raw.to_string());
    let (x, y) = raw.split_once(',').ok_or_else(invalid)?;
    let x: f64 = x.trim().parse().map_err(|_| invalid())?;
    let y: f64 = y.trim().parse().map_err(|_| invalid())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(invalid());
    }
    Ok(PointDto { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stroke_with_multiple_points() {
        // テスト項目: stroke コマンドで複数の点をパースできる
        // given (前提条件):
        let line = "stroke 0,0 10,5.5 20,10";

        // when (操作):
        let command = Command::parse(line).unwrap();

        // then (期待する結果):
        assert_eq!(
            command,
            Command::Draw {
                kind: OperationKind::Stroke,
                path: vec![
                    PointDto { x: 0.0, y: 0.0 },
                    PointDto { x: 10.0, y: 5.5 },
                    PointDto { x: 20.0, y: 10.0 },
                ],
            }
        );
    }

    #[test]
    fn test_parse_erase_requires_points() {
        // テスト項目: 点の無い erase コマンドはエラーになる
        // given (前提条件):
        let line = "erase";

        // when (操作):
        let result = Command::parse(line);

        // then (期待する結果):
        assert_eq!(result, Err(CommandError::MissingArgument("erase")));
    }

    #[test]
    fn test_parse_invalid_point() {
        // テスト項目: x,y 形式でない点はエラーになる
        // given (前提条件):
        let line = "stroke 1,2 nope";

        // when (操作):
        let result = Command::parse(line);

        // then (期待する結果):
        assert_eq!(result, Err(CommandError::InvalidPoint("nope".to_string())));
    }

    #[test]
    fn test_parse_width() {
        // テスト項目: width コマンドは非負の数値のみ受け付ける
        // given (前提条件):

        // when (操作):
        let valid = Command::parse("width 6");
        let negative = Command::parse("width -1");

        // then (期待する結果):
        assert_eq!(valid, Ok(Command::Width(6.0)));
        assert_eq!(negative, Err(CommandError::InvalidWidth("-1".to_string())));
    }

    #[test]
    fn test_parse_simple_commands() {
        // テスト項目: 引数の無いコマンドと短縮形をパースできる
        // given (前提条件):
        let cases = [
            ("undo", Command::Undo),
            ("r", Command::Redo),
            ("sync", Command::Sync),
            ("who", Command::Who),
            ("show", Command::Show),
            ("help", Command::Help),
            ("exit", Command::Quit),
            ("color rgb(10,20,30)", Command::Color("rgb(10,20,30)".to_string())),
            ("move 3,4", Command::Move(PointDto { x: 3.0, y: 4.0 })),
        ];

        for (line, expected) in cases {
            // when (操作):
            let command = Command::parse(line);

            // then (期待する結果):
            assert_eq!(command, Ok(expected), "line: {}", line);
        }
    }

    #[test]
    fn test_parse_unknown_command() {
        // テスト項目: 未知のコマンドはエラーになる
        // given (前提条件):
        let line = "paint 1,1";

        // when (操作):
        let result = Command::parse(line);

        // then (期待する結果):
        assert_eq!(result, Err(CommandError::Unknown("paint".to_string())));
    }
}
