//! Deterministic prompt construction for diagram generation.
//!
//! # Responsibility
//! - Build the fixed two-message prompt for one diagram kind.
//! - Anchor the model's output format with one complete sample script per
//!   kind.
//!
//! # Invariants
//! - For a fixed kind the system message is byte-identical across calls.
//! - The user message carries the target source URL and nothing else.

use crate::llm::ChatMessage;
use crate::model::diagram::DiagramKind;

/// Sample question URL paired with every one-shot answer. Fixed so system
/// messages stay stable across calls.
const EXAMPLE_QUESTION_URL: &str =
    "https://github.com/HSU-Likelion-CareerDoctor/CareerDoctor-Backend";

const CLASS_EXAMPLE: &str = "classDiagram
    GameController --> GameFrame
    GameController --> WordGenerator
    GameController --> Timer
    GameFrame --> Player
    GameFrame --> Word
    GameFrame --> Score
    GameController : +startGame()
    GameController : +endGame()
    GameController : +updateGame()
    class GameController {
        +List~Word~ words
        +Player player
        +Score score
        +Timer timer
        +startGame()
        +endGame()
        +updateGame()
    }
    class GameFrame {
        +displayWord()
        +displayScore()
        +displayTime()
    }
    class WordGenerator {
        +generateWord()
    }
";

const SEQUENCE_EXAMPLE: &str = "sequenceDiagram
    participant User as User
    participant API as API Controller
    participant Service as Service Layer
    participant Repo as Repo
    participant DB as Database

    User->>API: Request API endpoint
    API->>Service: Call Service method
    Service->>Repo: Query data
    Repo->>DB: Execute database query
    DB-->>Repo: Return query result
    Repo-->>Service: Return data to Service
    Service-->>API: Return processed data
    API-->>User: Send response back to User
";

const ERD_EXAMPLE: &str = "erDiagram
    USERS {
        INT id PK
        VARCHAR username
        VARCHAR email
        VARCHAR password
        DATETIME created_at
        DATETIME updated_at
    }

    POSTS {
        INT id PK
        VARCHAR title
        TEXT content
        INT user_id FK
        DATETIME created_at
        DATETIME updated_at
    }

    USERS ||--o{ POSTS : \"has\"
";

/// Returns the complete one-shot sample script for `kind`.
pub fn example_script(kind: DiagramKind) -> &'static str {
    match kind {
        DiagramKind::Class => CLASS_EXAMPLE,
        DiagramKind::Sequence => SEQUENCE_EXAMPLE,
        DiagramKind::Erd => ERD_EXAMPLE,
    }
}

/// Builds the fixed system message for `kind`.
///
/// # Contract
/// - Pure function of `kind`; byte-identical output across calls.
pub fn system_message(kind: DiagramKind) -> String {
    let notation = kind.spec().notation;
    let example = example_script(kind);
    format!(
        "Open the link given in the user message and inspect every directory and code file \
         in the Git repository. Generate a flow chart describing the code structure as a \
         {notation} script in plain text. Do not add any explanation; reply with the diagram \
         code block only, exactly like the sample answer.\n\
         <sample>\n[question]\n{EXAMPLE_QUESTION_URL}\n[answer]\n```\n{example}```\n"
    )
}

/// Builds the ordered two-message prompt for one generation request.
///
/// The user message is the literal source URL of the target repository;
/// no other repository content reaches the prompt.
pub fn build_messages(kind: DiagramKind, source_url: &str) -> [ChatMessage; 2] {
    [
        ChatMessage::system(system_message(kind)),
        ChatMessage::user(source_url),
    ]
}

#[cfg(test)]
mod tests {
    use super::{build_messages, example_script, system_message};
    use crate::llm::ChatRole;
    use crate::model::diagram::DiagramKind;

    #[test]
    fn system_message_is_byte_identical_across_calls() {
        for kind in DiagramKind::ALL {
            assert_eq!(system_message(kind), system_message(kind));
        }
    }

    #[test]
    fn system_messages_differ_across_kinds() {
        let class = system_message(DiagramKind::Class);
        let sequence = system_message(DiagramKind::Sequence);
        let erd = system_message(DiagramKind::Erd);
        assert_ne!(class, sequence);
        assert_ne!(sequence, erd);
        assert_ne!(class, erd);
    }

    #[test]
    fn examples_open_with_their_notation_keyword() {
        for kind in DiagramKind::ALL {
            assert!(example_script(kind).starts_with(kind.spec().notation));
        }
    }

    #[test]
    fn messages_are_system_then_user_with_source_url() {
        let url = "https://github.com/acme/widgets";
        let [system, user] = build_messages(DiagramKind::Class, url);

        assert_eq!(system.role, ChatRole::System);
        assert!(system.content.contains("classDiagram"));
        assert!(system.content.contains("[question]"));

        assert_eq!(user.role, ChatRole::User);
        assert_eq!(user.content, url);
    }
}
