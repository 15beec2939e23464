mod common;

use std::fs;
use std::sync::atomic::Ordering;

use common::{
    grades_url, login_url, rejected_url, sample_tab, test_config, FakeDriver, FakeLauncher,
    Script, StubClassifier,
};
use gpa_scrape::config::{selectors, sentinels};
use gpa_scrape::models::{codec, load_courses, Credentials, PointMode};
use gpa_scrape::services::gpa_service;
use gpa_scrape::{Acquisition, AcquireError, ScrapeOutcome};

fn credentials() -> Credentials {
    Credentials::parse("20231234\nsecret").unwrap()
}

/// 课程文件只含一行失败提示，且读不出任何课程
fn assert_single_failure_line(path: &std::path::Path, expected_prefix: &str) {
    let content = fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1, "{:?}", lines);
    assert!(lines[0].starts_with(expected_prefix), "{}", lines[0]);
    assert!(codec::parse(&lines, &[], PointMode::FromScore).is_empty());
}

#[tokio::test]
async fn test_scrape_writes_sections_and_closes_browser() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let driver = FakeDriver::new(Script {
        tabs_per_load: vec![vec![sample_tab()]],
        ..Script::authenticated()
    });
    let state = driver.state();
    let launcher = FakeLauncher::new(driver);
    let launches = launcher.launch_count();

    let mut acquisition = Acquisition::new(&config, launcher, StubClassifier::new(&["x7K2"]));
    let outcome = acquisition.run(Some(&credentials())).await.unwrap();

    assert_eq!(outcome, ScrapeOutcome::Saved { sections: 1, courses: 2 });
    assert_eq!(launches.load(Ordering::SeqCst), 1);
    assert!(!acquisition.has_session());

    let content = fs::read_to_string(&config.courses_file).unwrap();
    assert_eq!(
        content,
        "必修课程\nCalculus-I elective 4 92 4.0\nPhysics-II elective 3 76 2.7\n"
    );

    let state = state.lock().unwrap();
    assert!(state.quit);
    let log = &state.log;
    let typed_user = log.iter().position(|l| l == "type #input_username 20231234").unwrap();
    let typed_pass = log.iter().position(|l| l == "type #input_password secret").unwrap();
    let captcha = log.iter().position(|l| l == "click #captchaImg").unwrap();
    let typed_code = log.iter().position(|l| l == "type #input_checkcode x7K2").unwrap();
    let login = log.iter().position(|l| l == "click #loginButton").unwrap();
    assert!(typed_user < typed_pass && typed_pass < captcha && captcha < typed_code && typed_code < login);
    assert_eq!(log.last().map(String::as_str), Some("quit"));
}

#[tokio::test]
async fn test_scraped_file_feeds_gpa_engine() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let launcher = FakeLauncher::new(FakeDriver::new(Script {
        tabs_per_load: vec![vec![sample_tab()]],
        ..Script::authenticated()
    }));

    let mut acquisition = Acquisition::new(&config, launcher, StubClassifier::new(&["abcd"]));
    acquisition.run(Some(&credentials())).await.unwrap();

    let courses = load_courses(&config.courses_file, &config.ignore_file, PointMode::FromScore)
        .await
        .unwrap();
    assert_eq!(courses.len(), 2);

    let report = gpa_service::compute(&courses);
    assert_eq!(report.total_credits, 7);
    assert!((report.gpa - (4.0 * 4.0 + 3.0 * 2.7) / 7.0).abs() < 1e-9);
    assert!((report.influence_of(0) - (report.gpa - 2.7)).abs() < 1e-9);
}

#[tokio::test]
async fn test_captcha_exhaustion_surfaces_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let driver = FakeDriver::new(Script::authenticated());
    let state = driver.state();

    let mut acquisition = Acquisition::new(
        &config,
        FakeLauncher::new(driver),
        StubClassifier::new(&["ab1"]),
    );
    let err = acquisition.run(Some(&credentials())).await.unwrap_err();

    assert!(matches!(err, AcquireError::CaptchaExhausted { attempts: 4, .. }));
    let state = state.lock().unwrap();
    assert_eq!(state.count("screenshot"), config.max_captcha_attempts);
    assert_eq!(state.count("click #loginButton"), 0);
    assert!(state.quit);
    drop(state);
    assert_single_failure_line(
        &config.courses_file,
        &format!("{}：验证码识别失败", sentinels::ACQUISITION_FAILED),
    );
}

#[tokio::test]
async fn test_rejected_login_records_sentinel_without_retry() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    fs::write(&config.courses_file, "高数 必修 4 92 4.0\n").unwrap();
    let driver = FakeDriver::new(Script::rejected());
    let state = driver.state();

    let mut acquisition =
        Acquisition::new(&config, FakeLauncher::new(driver), StubClassifier::new(&["abcd"]));
    let outcome = acquisition.run(Some(&credentials())).await.unwrap();

    assert_eq!(outcome, ScrapeOutcome::Rejected);
    assert!(matches!(outcome.into_result(), Err(AcquireError::LoginRejected)));

    let content = fs::read_to_string(&config.courses_file).unwrap();
    assert_eq!(content, format!("高数 必修 4 92 4.0\n{}\n", sentinels::LOGIN_REJECTED));

    let state = state.lock().unwrap();
    assert_eq!(state.count("click #loginButton"), 1);
    assert_eq!(state.grades_loads, 0);
    assert!(state.quit);
}

#[tokio::test]
async fn test_no_tabs_until_budget_exhausted_writes_one_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    assert_eq!(config.max_refresh_times, 4);
    let driver = FakeDriver::new(Script::authenticated());
    let state = driver.state();

    let mut acquisition =
        Acquisition::new(&config, FakeLauncher::new(driver), StubClassifier::new(&["abcd"]));
    let outcome = acquisition.run(Some(&credentials())).await.unwrap();

    assert_eq!(outcome, ScrapeOutcome::NoTranscript { attempts: 5 });

    let content = fs::read_to_string(&config.courses_file).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines, vec![sentinels::NO_TRANSCRIPT]);
    assert!(codec::parse(&lines, &[], PointMode::FromScore).is_empty());

    let state = state.lock().unwrap();
    assert_eq!(state.grades_loads, 5);
    assert_eq!(state.count("refresh"), 4);
    assert!(state.quit);
}

#[tokio::test]
async fn test_invalidated_session_logs_in_again() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let driver = FakeDriver::new(Script {
        urls_after_grades: vec![login_url()],
        tabs_per_load: vec![Vec::new(), vec![sample_tab()]],
        ..Script::authenticated()
    });
    let state = driver.state();
    let launcher = FakeLauncher::new(driver);
    let launches = launcher.launch_count();

    let mut acquisition = Acquisition::new(&config, launcher, StubClassifier::new(&["abcd"]));
    let outcome = acquisition.run(Some(&credentials())).await.unwrap();

    assert_eq!(outcome, ScrapeOutcome::Saved { sections: 1, courses: 2 });
    // 复用同一个浏览器会话
    assert_eq!(launches.load(Ordering::SeqCst), 1);

    let state = state.lock().unwrap();
    assert_eq!(state.count(&format!("navigate {}", login_url())), 2);
    assert_eq!(state.count(&format!("navigate {}", grades_url())), 2);
    assert_eq!(state.count("refresh"), 0);
}

#[tokio::test]
async fn test_missing_credentials_never_launch_browser() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let launcher = FakeLauncher::new(FakeDriver::new(Script::authenticated()));
    let launches = launcher.launch_count();

    let mut acquisition = Acquisition::new(&config, launcher, StubClassifier::new(&["abcd"]));
    let err = acquisition.run(None).await.unwrap_err();

    assert!(matches!(err, AcquireError::CredentialsMissing));
    assert_eq!(launches.load(Ordering::SeqCst), 0);
    assert_single_failure_line(&config.courses_file, sentinels::ACQUISITION_FAILED);
}

#[tokio::test]
async fn test_login_page_timeout_is_recoverable_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let driver = FakeDriver::new(Script {
        missing_selectors: vec![selectors::USERNAME_INPUT.to_string()],
        ..Script::authenticated()
    });
    let state = driver.state();

    let mut acquisition =
        Acquisition::new(&config, FakeLauncher::new(driver), StubClassifier::new(&["abcd"]));
    let err = acquisition.run(Some(&credentials())).await.unwrap_err();

    assert!(matches!(err, AcquireError::ElementTimeout { ref selector, secs: 10 } if selector == "#input_username"));
    assert!(err.is_recoverable());
    assert!(state.lock().unwrap().quit);
    assert_single_failure_line(
        &config.courses_file,
        &format!("{}：等待元素_#input_username_超时", sentinels::ACQUISITION_FAILED),
    );
}

#[tokio::test]
async fn test_launch_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let mut acquisition =
        Acquisition::new(&config, FakeLauncher::failing(), StubClassifier::new(&["abcd"]));
    let err = acquisition.run(Some(&credentials())).await.unwrap_err();

    assert!(matches!(err, AcquireError::DriverLaunchFailure { .. }));
    assert_single_failure_line(
        &config.courses_file,
        &format!("{}：无法启动浏览器", sentinels::ACQUISITION_FAILED),
    );
}

#[tokio::test]
async fn test_error_keeps_previous_records() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    fs::write(&config.courses_file, "高数 必修 4 92 4.0\n").unwrap();

    let mut acquisition =
        Acquisition::new(&config, FakeLauncher::failing(), StubClassifier::new(&["abcd"]));
    acquisition.run(Some(&credentials())).await.unwrap_err();

    let content = fs::read_to_string(&config.courses_file).unwrap();
    assert!(content.starts_with("高数 必修 4 92 4.0\n"));
    let courses = load_courses(&config.courses_file, &config.ignore_file, PointMode::FromScore)
        .await
        .unwrap();
    assert_eq!(courses.len(), 1);
}

#[tokio::test]
async fn test_rejected_relogin_stops_polling() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let driver = FakeDriver::new(Script {
        after_login_urls: vec!["https://jwxt.imu.edu.cn/index".to_string(), rejected_url()],
        urls_after_grades: vec![login_url()],
        ..Script::authenticated()
    });
    let state = driver.state();

    let mut acquisition =
        Acquisition::new(&config, FakeLauncher::new(driver), StubClassifier::new(&["abcd"]));
    let outcome = acquisition.run(Some(&credentials())).await.unwrap();

    assert_eq!(outcome, ScrapeOutcome::Rejected);
    let content = fs::read_to_string(&config.courses_file).unwrap();
    assert_eq!(content, format!("{}\n", sentinels::LOGIN_REJECTED));

    let state = state.lock().unwrap();
    assert_eq!(state.login_clicks, 2);
    assert_eq!(state.grades_loads, 1);
    assert_eq!(state.count("refresh"), 0);
    assert!(state.quit);
}

#[tokio::test]
async fn test_relogin_timeout_uses_one_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let driver = FakeDriver::new(Script {
        urls_after_grades: vec![login_url()],
        tabs_per_load: vec![Vec::new(), vec![sample_tab()]],
        // 第二次打开登录页时卡住
        stalled_logins: vec![1],
        ..Script::authenticated()
    });
    let state = driver.state();

    let mut acquisition =
        Acquisition::new(&config, FakeLauncher::new(driver), StubClassifier::new(&["abcd"]));
    let outcome = acquisition.run(Some(&credentials())).await.unwrap();

    assert_eq!(outcome, ScrapeOutcome::Saved { sections: 1, courses: 2 });

    let state = state.lock().unwrap();
    assert_eq!(state.login_loads, 2);
    // 卡住的那次没有填写账号
    assert_eq!(state.count("type #input_username"), 1);
    assert_eq!(state.login_clicks, 1);
    assert_eq!(state.grades_loads, 2);
    assert!(state.quit);
}
