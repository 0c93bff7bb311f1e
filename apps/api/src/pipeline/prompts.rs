//! Prompt templates for every generation intent, with their fixed
//! temperatures. Templates interpolate source fields via `replace` — no
//! other module builds prompt strings.

/// The purpose of one generation call. Each intent maps to exactly one
/// template and one temperature: low for extraction and corrective work
/// that demands fidelity, high for creative rewriting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptIntent {
    DecomposeTasks,
    ExplainTask,
    RewriteForAd,
    NormalizeTitle,
    RetryInvalidTitle,
    GenerateTitleVariations,
    RewriteCatchphrase,
    /// Early combined duplication call: one response carrying both a
    /// rewritten title and a rewritten detail as labeled lines.
    DuplicateListing,
    /// Pair-based ad rewrite: title + detail in, one 案内文 out.
    RewriteListing,
}

impl PromptIntent {
    pub fn temperature(self) -> f32 {
        match self {
            PromptIntent::DecomposeTasks
            | PromptIntent::ExplainTask
            | PromptIntent::RetryInvalidTitle => 0.3,
            PromptIntent::NormalizeTitle => 0.5,
            PromptIntent::RewriteForAd
            | PromptIntent::GenerateTitleVariations
            | PromptIntent::RewriteCatchphrase
            | PromptIntent::DuplicateListing
            | PromptIntent::RewriteListing => 0.7,
        }
    }
}

const DECOMPOSE_TASKS_TEMPLATE: &str = "\
以下は求人広告の情報です。
この仕事に含まれる具体的な作業内容を、箇条書きでリストアップしてください。
箇条書きの各項目は、日本語で20文字以内に簡潔にまとめてください。
作業名だけを出力してください（前置きや補足は不要です）。
---
職種: {title}
仕事内容: {detail}
";

const EXPLAIN_TASK_TEMPLATE: &str = "\
以下の仕事内容の説明をもとに、「{task}」という作業が具体的に何を意味するのかを簡潔に説明してください。
---
仕事内容の説明: {detail}
---
作業の説明:
";

const REWRITE_FOR_AD_TEMPLATE: &str = "\
以下の説明文を、求人広告で使用する自然な仕事の説明文に書き換えてください。
以下のような文章のスタイルを参考にしてください。

【例文1】
製造装置への部材セットをお任せします。カメラの製造工程において、製造装置に必要な部材をセットする作業で、大小様々な材料を装置にセットして、製品の製造をスムーズに進める役割のお仕事です。

【例文2】
完成品の検査業務をお任せします。製造された製品にキズや不備がないかを確認するお仕事で、目視や道具を使って丁寧にチェックする作業です。

【例文3】
部品の梱包作業をお任せします。指定された部品をまとめ、箱に詰めてラベルを貼る作業で、出荷準備を整える大切なお仕事です。

---
元の説明: {explanation}
---
仕事の説明文（求人広告向け）:
";

const NORMALIZE_TITLE_TEMPLATE: &str = "\
以下の職種名を、求人広告で使える自然な職種名に整えてください。
出力は25文字以内で、「です」「ます」や句読点を付けずに簡潔な名詞として作成してください。
---
元の職種名（案）: {candidate}
---
整形後:
";

const RETRY_INVALID_TITLE_TEMPLATE: &str = "\
以下の表現は職種名として不適切です。求人広告で使える自然な職種名に修正してください。
---
修正前: {title}
---
職種名:
";

const TITLE_VARIATIONS_TEMPLATE: &str = "\
以下の職種名をもとに、求人広告で使える自然な職種名のバリエーションを{count}個作成してください。
単語を言い換えたり、記号を変更したり、語順を変更したり、表現を言い換えて、重複しないようにしてください。
箇条書きで出力してください。
---
職種名: {title}
---
";

const REWRITE_LISTING_TEMPLATE: &str = "\
以下の職種名と仕事内容をもとに、単語を言い換えたり、記号を変更したり、語順を変更したりして、全く異なる表現にリライトしてください。
出力は、求人広告で使用する自然な文章で作成してください。
---
職種名: {title}
仕事内容: {detail}
---
案内文:
";

const REWRITE_CATCHPHRASE_TEMPLATE: &str = "\
以下の求人広告のキャッチコピーをもとに、単語を言い換えたり、記号や語順を変更したりして、全く異なる自然な表現の新しいキャッチコピーを作成してください。
---
キャッチコピー: {catchphrase}
---
新しいキャッチコピー:
";

const DUPLICATE_LISTING_TEMPLATE: &str = "\
以下の職種名と仕事内容をもとに、表現を言い換えた別バージョンを1つ作成してください。
出力は必ず次の2行の形式で返してください。
職種名: <言い換えた職種名>
仕事内容: <言い換えた仕事内容>
---
職種名: {title}
仕事内容: {detail}
";

pub fn decompose_tasks(title: &str, detail: &str) -> String {
    DECOMPOSE_TASKS_TEMPLATE
        .replace("{title}", title)
        .replace("{detail}", detail)
}

pub fn explain_task(task: &str, detail: &str) -> String {
    EXPLAIN_TASK_TEMPLATE
        .replace("{task}", task)
        .replace("{detail}", detail)
}

pub fn rewrite_for_ad(explanation: &str) -> String {
    REWRITE_FOR_AD_TEMPLATE.replace("{explanation}", explanation)
}

pub fn normalize_title(candidate: &str) -> String {
    NORMALIZE_TITLE_TEMPLATE.replace("{candidate}", candidate)
}

pub fn retry_invalid_title(title: &str) -> String {
    RETRY_INVALID_TITLE_TEMPLATE.replace("{title}", title)
}

pub fn title_variations(title: &str, count: usize) -> String {
    TITLE_VARIATIONS_TEMPLATE
        .replace("{count}", &count.to_string())
        .replace("{title}", title)
}

pub fn rewrite_listing(title: &str, detail: &str) -> String {
    REWRITE_LISTING_TEMPLATE
        .replace("{title}", title)
        .replace("{detail}", detail)
}

pub fn rewrite_catchphrase(catchphrase: &str) -> String {
    REWRITE_CATCHPHRASE_TEMPLATE.replace("{catchphrase}", catchphrase)
}

pub fn duplicate_listing(title: &str, detail: &str) -> String {
    DUPLICATE_LISTING_TEMPLATE
        .replace("{title}", title)
        .replace("{detail}", detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_intents_run_cold() {
        assert_eq!(PromptIntent::DecomposeTasks.temperature(), 0.3);
        assert_eq!(PromptIntent::ExplainTask.temperature(), 0.3);
        assert_eq!(PromptIntent::RetryInvalidTitle.temperature(), 0.3);
    }

    #[test]
    fn test_creative_intents_run_hot() {
        assert_eq!(PromptIntent::RewriteForAd.temperature(), 0.7);
        assert_eq!(PromptIntent::GenerateTitleVariations.temperature(), 0.7);
        assert_eq!(PromptIntent::RewriteCatchphrase.temperature(), 0.7);
        assert_eq!(PromptIntent::RewriteListing.temperature(), 0.7);
    }

    #[test]
    fn test_decompose_interpolates_both_fields() {
        let prompt = decompose_tasks("工場での組立", "部品を組み立てる仕事");
        assert!(prompt.contains("職種: 工場での組立"));
        assert!(prompt.contains("仕事内容: 部品を組み立てる仕事"));
        assert!(!prompt.contains("{title}"));
        assert!(!prompt.contains("{detail}"));
    }

    #[test]
    fn test_explain_quotes_the_task() {
        let prompt = explain_task("部品の検品", "製品を検査する仕事");
        assert!(prompt.contains("「部品の検品」"));
    }

    #[test]
    fn test_title_variations_carries_count() {
        let prompt = title_variations("フォークリフト作業員", 5);
        assert!(prompt.contains("バリエーションを5個"));
        assert!(prompt.contains("職種名: フォークリフト作業員"));
    }

    #[test]
    fn test_duplicate_listing_demands_labeled_lines() {
        let prompt = duplicate_listing("組立", "部品の組立");
        assert!(prompt.contains("職種名: <言い換えた職種名>"));
        assert!(prompt.contains("仕事内容: <言い換えた仕事内容>"));
    }
}
