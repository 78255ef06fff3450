//! Prompt construction for the upstream model.
//!
//! The model is told to answer with nothing but a JSON object carrying the
//! three result fields. It is not trusted to comply; see
//! [`normalize`](crate::normalize).

/// Build the single prompt string for a submitted sentence.
///
/// `context` is the exercise prompt (e.g. the Japanese sentence the learner
/// was asked to translate) and is embedded verbatim so the model can judge
/// whether the answer matches the intended meaning.
pub fn build_prompt(text: &str, context: Option<&str>) -> String {
    format!(
        r#"以下の英文を評価し、JSON形式で返してください。
{{
  "corrected": "自然で文法的に正しい英文",
  "score": 100点満点のスコア（整数）,
  "advice": "改善点のアドバイス（日本語で、丁寧に、中学生向けにわかりやすく）。２００文字程度で、問題の意図も踏まえてください。"
}}
JSONオブジェクトのみを出力し、説明文やコードブロックは付けないでください。
{}
ユーザーの回答: "{}"
"#,
        context.unwrap_or(""),
        text
    )
}
