use quiz_client::{
    config::{get_config, init_config, LogFormat},
    services::http_gateway::HttpQuizGateway,
    utils::documents::load_documents,
    QuizFlowService, Stage,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::EnvFilter;

type Input = Lines<BufReader<Stdin>>;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quiz_client=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn prompt(input: &mut Input, message: &str) -> anyhow::Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(message.as_bytes()).await?;
    stdout.flush().await?;
    Ok(input.next_line().await?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(config.log_format);
    info!(api = %config.api_base_url, "Starting quiz client");

    let gateway = HttpQuizGateway::from_config(config)?;
    let flow = QuizFlowService::new(Arc::new(gateway));
    let mut input: Input = BufReader::new(tokio::io::stdin()).lines();
    let mut pending_paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();

    loop {
        match flow.stage() {
            Stage::Upload => {
                if pending_paths.is_empty() {
                    let Some(line) = prompt(&mut input, "\nDocuments to quiz on (paths separated by spaces, empty to quit): ").await? else {
                        break;
                    };
                    if line.trim().is_empty() {
                        break;
                    }
                    pending_paths = line.split_whitespace().map(PathBuf::from).collect();
                }

                let paths = std::mem::take(&mut pending_paths);
                let documents = match load_documents(&paths).await {
                    Ok(docs) => docs,
                    Err(e) => {
                        println!("Could not read documents: {}", e);
                        continue;
                    }
                };
                println!("Generating quiz...");
                if let Err(e) = flow.upload(documents).await {
                    println!("Error uploading documents or generating quiz: {}", e);
                }
            }
            Stage::Mcq => {
                let questions = flow.snapshot().quiz.mcq;
                println!("\nMultiple Choice Questions");
                for (n, question) in questions.iter().enumerate() {
                    println!("\n{}. {}", n + 1, question.question);
                    for (i, option) in question.options.iter().enumerate() {
                        println!("   [{}] {}", i + 1, option);
                    }
                    loop {
                        let Some(line) = prompt(&mut input, "Your choice: ").await? else {
                            return Ok(());
                        };
                        match line.trim().parse::<usize>() {
                            Ok(i) if (1..=question.options.len()).contains(&i) => {
                                flow.record_mcq_answer(&question.id, &question.options[i - 1]);
                                break;
                            }
                            _ => println!("Please pick a number between 1 and {}", question.options.len()),
                        }
                    }
                }
                flow.finish_stage()?;
            }
            Stage::Saq => {
                let questions = flow.snapshot().quiz.saq;
                println!("\nShort Answer Questions");
                for (n, question) in questions.iter().enumerate() {
                    println!("\n{}. {}", n + 1, question.question);
                    let Some(line) = prompt(&mut input, "> ").await? else {
                        return Ok(());
                    };
                    flow.record_saq_answer(&question.id, line.trim_end());
                }
                flow.finish_stage()?;
            }
            Stage::Submit => {
                let state = flow.snapshot();
                println!(
                    "\nQuiz completed! {} multiple choice and {} short answers recorded.",
                    state.mcq_answers.len(),
                    state.saq_answers.len()
                );
                let Some(line) = prompt(&mut input, "Press Enter to submit, or type 'quit' to abandon: ").await? else {
                    break;
                };
                if line.trim().eq_ignore_ascii_case("quit") {
                    flow.reset();
                    continue;
                }
                match flow.submit().await {
                    Ok(ack) => {
                        println!("{}", ack.message.as_deref().unwrap_or("Quiz submitted successfully!"));
                        if let (Some(score), Some(total)) = (ack.mcq_score, ack.mcq_total) {
                            println!("Multiple choice score: {}/{}", score, total);
                        }
                        if let Some(pending) = ack.saq_pending {
                            println!("Short answers pending review: {}", pending);
                        }
                    }
                    Err(e) if e.is_retryable() => {
                        println!("Error submitting quiz: {}. Your answers are kept, try again.", e);
                    }
                    Err(e) => println!("Error submitting quiz: {}", e),
                }
            }
        }
    }

    info!(session_id = %flow.session_id(), "Quiz client stopped");
    Ok(())
}
