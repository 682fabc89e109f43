// File: admitbot-core/src/survey/catalog.rs
//
// Operator-facing texts and reply options of the interview survey.

use admitbot_common::traits::SinkMode;

use crate::survey::state::SurveyState;

/// Global restart trigger, accepted in every state.
pub const RESTART_TRIGGER: &str = "🔄 Перезапустить бот";

/// Starts a fresh survey from the terminal state.
pub const CONTINUE_TRIGGER: &str = "Далее";

/// Canonical-obstacles answer that ends the interview early.
pub const INELIGIBLE_OBSTACLE: &str = "Есть канонические препятствия, НЕ можем принять в ПСТБИ";

pub const CANCEL_TEXT: &str = "Опрос отменен. Для начала нового нажмите /start.";

const FIRST_STEP_PROMPT: &str = "Шаг 1: Введите ФИО абитуриента:";

const COMPLETION_FOOTER: &str = "Спасибо!\nЧтобы отправить еще один отзыв, нажмите 'Далее'";

/// How the operator is expected to answer a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Closed set of buttons.
    Choice,
    /// Any text; buttons, if present, are only suggestions.
    FreeText,
}

/// One survey question as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: &'static str,
    pub options: &'static [&'static [&'static str]],
    pub mode: InputMode,
}

impl Question {
    /// Option rows with the restart row appended.
    pub fn keyboard(&self) -> Vec<Vec<String>> {
        with_restart_row(self.options)
    }

    /// Whether `input` is one of the offered buttons.
    pub fn offers(&self, input: &str) -> bool {
        self.options.iter().any(|row| row.contains(&input))
    }
}

/// Appends the restart row to a set of option rows.
pub fn with_restart_row(options: &[&[&str]]) -> Vec<Vec<String>> {
    options
        .iter()
        .map(|row| row.iter().map(|s| s.to_string()).collect())
        .chain(std::iter::once(vec![RESTART_TRIGGER.to_string()]))
        .collect()
}

const VERDICT_OPTIONS: &[&[&str]] = &[
    &["Да", "Нет"],
    &["Надо посоветоваться", "Пока пускай поступает на БФ, через год посмотрим"],
];

/// Question asked on entering `state`. `None` for the terminal state.
pub fn question(state: SurveyState) -> Option<Question> {
    use InputMode::*;

    let (prompt, options, mode): (&'static str, &'static [&'static [&'static str]], InputMode) = match state {
        SurveyState::Name => (FIRST_STEP_PROMPT, &[], FreeText),
        SurveyState::Interviewer => (
            "Шаг 2: Кто проводил собеседование?",
            &[
                &["прот. Николай Емельянов", "прот. Константин Стриевский"],
                &["иер. Иван Воробьев", "иер. Алексей Захаров"],
            ],
            Choice,
        ),
        SurveyState::CanonicalObstacles => (
            "Шаг 3: Наличие канонических препятствий.",
            &[
                &[INELIGIBLE_OBSTACLE],
                &["Есть канонические препятствия, нужно благословение владыки"],
                &["Надо посоветоваться с проректором"],
                &["Нет канонических препятствий, можем принять в ПСТБИ"],
                &["Нет канонических препятствий, с поступлением стоит подождать"],
            ],
            Choice,
        ),
        SurveyState::SpiritualGuide => (
            "Шаг 4: Наличие духовника и благословения на поступление",
            &[
                &["Есть духовник, благословил учиться"],
                &["Есть духовник, готов благословить учиться"],
                &["Есть духовник, пока не готов благословить учиться"],
                &["Духовника как такового нет, есть священник, который готов благословить учиться"],
                &["Нет духовника"],
            ],
            Choice,
        ),
        SurveyState::Impression1 => (
            "Шаг 5: Ваши впечатления от общения с абитуриентом",
            &[
                &["Общительный, открытый", "Замкнутый"],
                &["Слишком общительный", "Затрудняюсь ответить"],
            ],
            FreeText,
        ),
        SurveyState::Impression2 => (
            "Шаг 6: Продолжаем",
            &[&["Давно в церкви", "Недавно в церкви"], &["Затрудняюсь ответить"]],
            FreeText,
        ),
        SurveyState::Impression3 => (
            "Шаг 7: Продолжаем",
            &[
                &["Из церковной семьи", "Из не церковной семьи"],
                &["Затрудняюсь ответить"],
            ],
            FreeText,
        ),
        SurveyState::Impression4 => (
            "Шаг 8: Продолжаем",
            &[
                &["Помогает в храме", "Ничем не занят в храме"],
                &["Затрудняюсь ответить"],
            ],
            FreeText,
        ),
        SurveyState::Impression5 => (
            "Шаг 9: Еще немного",
            &[
                &["Жена из церковной семьи", "Жена из не церковной семьи"],
                &["Не женат", "Затрудняюсь ответить"],
            ],
            FreeText,
        ),
        SurveyState::Impression6 => (
            "Шаг 10: Почти закончили",
            &[
                &["Состоявшийся мужчина", "Вполне зрелый"],
                &["Совсем еще не зрелый", "Затрудняюсь ответить"],
            ],
            FreeText,
        ),
        SurveyState::StudyProblems => (
            "Шаг 11: Какие проблемы, как вам кажется, могут возникнуть в процессе учебы?\n(если никаких, напишите 'нет')",
            &[],
            FreeText,
        ),
        SurveyState::GeneralComments => ("Шаг 12: Ваши общие впечатления и комментарии", &[], FreeText),
        SurveyState::Verdict => (
            "Шаг 13: Ваш вердикт: допускаем ли мы абитуриента к вступительному экзамену?",
            VERDICT_OPTIONS,
            Choice,
        ),
        SurveyState::AwaitingContinue => return None,
    };

    Some(Question { prompt, options, mode })
}

/// Which event brought the session back to the first question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Greeting {
    Start,
    Restart,
    Continue,
}

pub fn status_line(mode: SinkMode) -> &'static str {
    match mode {
        SinkMode::Durable => "✅ Google Sheets подключен",
        SinkMode::Degraded => "⚠️  Google Sheets отключен - данные сохраняются локально",
    }
}

pub fn greeting_text(kind: Greeting, mode: SinkMode) -> String {
    let prefix = match kind {
        Greeting::Start => "",
        Greeting::Restart => "🔄 Бот перезапущен!\n\n",
        Greeting::Continue => "🔄 Начинаем новый опрос!\n\n",
    };
    format!(
        "{prefix}Здравствуйте!\nПоделитесь своим впечатлением от собеседования.\n\nСтатус: {}\n\n{FIRST_STEP_PROMPT}",
        status_line(mode)
    )
}

/// Terminal prompt after a persist attempt.
pub fn completion_text(stored: bool, mode: SinkMode, backup_location: &str) -> String {
    let headline = match (stored, mode) {
        (true, _) => "✅ Данные успешно сохранены!".to_string(),
        (false, SinkMode::Durable) => {
            "❌ Произошла ошибка при сохранении в Google Sheets.\nДанные сохранены локально.".to_string()
        }
        (false, SinkMode::Degraded) => {
            format!("⚠️  Google Sheets отключен. Данные сохранены локально в {backup_location}")
        }
    };
    format!("{headline}\n\n{COMPLETION_FOOTER}")
}

pub fn completion_keyboard() -> Vec<Vec<String>> {
    with_restart_row(&[&[CONTINUE_TRIGGER]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_question_state_has_a_numbered_prompt() {
        for state in SurveyState::ALL {
            match (question(state), state.step_number()) {
                (Some(q), Some(step)) => {
                    assert!(q.prompt.starts_with(&format!("Шаг {step}:")), "{state}: {}", q.prompt)
                }
                (None, None) => assert!(state.is_terminal()),
                other => panic!("{state}: mismatched {other:?}"),
            }
        }
    }

    #[test]
    fn keyboards_end_with_restart() {
        for state in SurveyState::ALL {
            if let Some(q) = question(state) {
                let kb = q.keyboard();
                assert_eq!(kb.last(), Some(&vec![RESTART_TRIGGER.to_string()]));
            }
        }
        assert_eq!(completion_keyboard()[0], vec![CONTINUE_TRIGGER.to_string()]);
    }

    #[test]
    fn free_text_states_have_no_options() {
        for state in [SurveyState::Name, SurveyState::StudyProblems, SurveyState::GeneralComments] {
            let q = question(state).unwrap();
            assert!(q.options.is_empty());
            assert_eq!(q.mode, InputMode::FreeText);
        }
    }

    #[test]
    fn offered_buttons() {
        let verdict = question(SurveyState::Verdict).unwrap();
        assert_eq!(verdict.mode, InputMode::Choice);
        assert!(verdict.offers("Нет"));
        assert!(verdict.offers("Надо посоветоваться"));
        assert!(!verdict.offers("нет"));
        assert!(!question(SurveyState::Name).unwrap().offers("Иванов"));
    }

    #[test]
    fn greeting_variants_carry_status() {
        let start = greeting_text(Greeting::Start, SinkMode::Durable);
        assert!(start.starts_with("Здравствуйте!"));
        assert!(start.contains("✅ Google Sheets подключен"));
        assert!(start.ends_with(FIRST_STEP_PROMPT));

        let restart = greeting_text(Greeting::Restart, SinkMode::Degraded);
        assert!(restart.starts_with("🔄 Бот перезапущен!"));
        assert!(restart.contains("сохраняются локально"));

        assert!(greeting_text(Greeting::Continue, SinkMode::Durable).starts_with("🔄 Начинаем новый опрос!"));
    }

    #[test]
    fn completion_text_variants() {
        assert!(completion_text(true, SinkMode::Durable, "x").starts_with("✅"));
        assert!(completion_text(false, SinkMode::Durable, "x").starts_with("❌"));
        let degraded = completion_text(false, SinkMode::Degraded, "backup_data.json");
        assert!(degraded.contains("backup_data.json"));
        assert!(degraded.ends_with(COMPLETION_FOOTER));
    }
}
