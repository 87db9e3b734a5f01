mod command;
mod render;

use std::io::BufRead;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;

use crate::core::shutdown::interrupt_signal;
use crate::core::state::AppState;
use crate::models::ExamId;
use crate::navigation::{routes, Navbar, Role};
use crate::services::exam_session::{
    ExamSessionController, LeaveAttempt, LeaveVerdict, SessionCallbacks, SessionError, Termination,
    UnloadVerdict,
};
use command::{Command, HELP};

/// Runs one exam attempt against stdin/stdout until the session ends or the
/// student closes the "tab" with a second Ctrl-C.
pub async fn take_exam(state: &AppState, exam_id: ExamId) -> anyhow::Result<()> {
    state.navigator().go_to(&routes::exam_route(exam_id));

    let callbacks = SessionCallbacks::default()
        .on_submitted(|receipt| println!("{}", render::receipt(receipt)))
        .on_abandoned(|| println!("Left the exam without saving."));
    let controller = match ExamSessionController::start(state, exam_id, callbacks).await {
        Ok(controller) => controller,
        Err(err) => {
            eprintln!("{}", err.user_message());
            return Err(err).context("exam session could not start");
        }
    };

    let navbar = Navbar::new(Role::Student, state.sessions().clone(), state.navigator().clone());
    tokio::spawn(time_warnings(controller.clone()));

    println!("{}", render::status_line(&controller.view().await));
    print_questions(&controller).await;
    println!("Type `help` for commands.");

    let mut lines = spawn_stdin_reader();
    let mut unload_warned = false;

    loop {
        tokio::select! {
            _ = controller.wait_terminated() => break,
            _ = interrupt_signal() => {
                if unload_warned {
                    state.sessions().discard().await;
                    println!("Closed without submitting.");
                    break;
                }
                match state.sessions().unload().await {
                    UnloadVerdict::Warn(message) => {
                        println!("{message} Press Ctrl-C again to leave.");
                        unload_warned = true;
                    }
                    UnloadVerdict::Proceed => break,
                }
            }
            line = lines.recv() => {
                let Some(line) = line else {
                    tracing::info!("stdin closed; leaving exam view");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(command) => handle(&controller, &navbar, state, command).await,
                    Err(err) => println!("{err}"),
                }
            }
        }
    }

    tracing::info!(
        exam_id = %exam_id,
        phase = controller.phase().as_str(),
        route = %state.navigator().current(),
        "Exam view closed"
    );
    Ok(())
}

async fn handle(
    controller: &ExamSessionController,
    navbar: &Navbar,
    state: &AppState,
    command: Command,
) {
    match command {
        Command::Show => print_questions(controller).await,
        Command::Status => println!("{}", render::status_line(&controller.view().await)),
        Command::Help => println!("{HELP}"),
        Command::Answer { number, option } => {
            let questions = controller.questions().await;
            let Some(question) = questions.get(number - 1) else {
                println!("There is no question {number}; the exam has {}.", questions.len());
                return;
            };
            match controller.select_answer(question.id, option).await {
                Ok(()) => println!("{}", render::status_line(&controller.view().await)),
                Err(err) => println!("{}", err.user_message()),
            }
        }
        Command::Submit => report(controller.submit().await),
        Command::Exit => {
            if controller.request_exit(LeaveAttempt::ExitButton).await == LeaveVerdict::Intercepted {
                print!("{}", render::exit_prompt());
            }
        }
        Command::Back => match state.sessions().request_exit(LeaveAttempt::Back).await {
            LeaveVerdict::Intercepted => print!("{}", render::exit_prompt()),
            LeaveVerdict::Proceed => state.navigator().go_back(),
        },
        Command::Navigate(path) => {
            if navbar.navigate(&path).await == LeaveVerdict::Intercepted {
                print!("{}", render::exit_prompt());
            }
        }
        Command::Choose(choice) => {
            if !controller.view().await.prompt_open {
                println!("No exit prompt is open. Use `exit` first.");
                return;
            }
            match controller.resolve_prompt(choice).await {
                Ok(Some(termination)) => report(Ok(termination)),
                Ok(None) => println!("Continuing the exam."),
                Err(err) => report(Err(err)),
            }
        }
    }
}

fn report(result: Result<Termination, SessionError>) {
    match result {
        Ok(Termination::Suppressed) => println!("The exam is already being submitted."),
        Ok(_) => {}
        Err(err) => println!("{} You can try again.", err.user_message()),
    }
}

async fn print_questions(controller: &ExamSessionController) {
    for (index, question) in controller.questions().await.iter().enumerate() {
        let answer = controller.answer(question.id).await;
        print!("{}", render::question(index + 1, question, answer));
    }
}

/// Reads stdin on a plain thread so a pending read never holds up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to read stdin");
                    break;
                }
            }
        }
    });
    rx
}

async fn time_warnings(controller: ExamSessionController) {
    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    let mut last_warned = None;
    while controller.is_live() {
        ticker.tick().await;
        let remaining = controller.view().await.remaining_seconds;
        if last_warned == Some(remaining) {
            continue;
        }
        if let Some(warning) = render::time_warning(remaining) {
            if controller.is_active() {
                println!("{warning}");
                last_warned = Some(remaining);
            }
        }
    }
}
